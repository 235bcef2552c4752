use std::sync::Arc;

use tonic::transport::{Channel, Endpoint};

use crate::abdpb::AbdServiceClient;
use crate::abdpb::EnableRequest;
use crate::abdpb::ExitRequest;
use crate::abdpb::NameRequest;
use crate::abdpb::ProtocolError;
use crate::abdpb::Rc;
use crate::abdpb::Read1Request;
use crate::abdpb::Read2Request;
use crate::abdpb::WriteRequest;
use crate::abdpb::{Address, Label, OpKind, Value};
use crate::store::{Adoption, Capabilities, ReplicaStore, Slot};
use crate::ReplicaError;

/// ReplicaClient is how a coordinator talks to one replica.
///
/// Besides the three data operations it carries the administrative calls used to inject
/// failures: enable, name and exit.
#[tonic::async_trait]
pub trait ReplicaClient: Send + Sync {
    /// endpoint returns the address of the replica, for diagnostics.
    fn endpoint(&self) -> &str;

    async fn read1(&self, addr: Address) -> Result<Slot, ReplicaError>;

    async fn read2(&self, addr: Address, label: Label, value: Value)
        -> Result<Adoption, ReplicaError>;

    async fn write(&self, addr: Address, label: Label, value: Value)
        -> Result<Adoption, ReplicaError>;

    async fn enable(&self, caps: Capabilities) -> Result<(), ReplicaError>;

    async fn name(&self) -> Result<String, ReplicaError>;

    async fn exit(&self) -> Result<(), ReplicaError>;
}

/// RemoteReplica is a replica behind a gRPC channel.
/// The channel connects on first use and reconnects after failures.
#[derive(Clone)]
pub struct RemoteReplica {
    endpoint: String,
    client: AbdServiceClient<Channel>,
}

impl RemoteReplica {
    /// connect_lazy creates a client of `endpoint`, e.g. `127.0.0.1:5001`.
    /// Nothing is sent until the first request.
    pub fn connect_lazy(endpoint: &str) -> Result<Self, ReplicaError> {
        let uri = if endpoint.contains("://") {
            endpoint.to_string()
        } else {
            format!("http://{}", endpoint)
        };

        let channel = Endpoint::from_shared(uri)
            .map_err(|e| ReplicaError::Unreachable(e.to_string()))?
            .connect_lazy();

        Ok(RemoteReplica {
            endpoint: endpoint.to_string(),
            client: AbdServiceClient::new(channel),
        })
    }
}

fn adoption_of(op: OpKind, code: i32) -> Result<Adoption, ReplicaError> {
    match Rc::from_i32(code) {
        Some(Rc::Ok) => Ok(Adoption::Adopted),
        Some(Rc::Stale) => Ok(Adoption::Stale),
        Some(Rc::Disabled) => Err(ReplicaError::Disabled(op)),
        None => Err(ProtocolError::UnknownRc(code).into()),
    }
}

#[tonic::async_trait]
impl ReplicaClient for RemoteReplica {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn read1(&self, addr: Address) -> Result<Slot, ReplicaError> {
        let mut client = self.client.clone();
        let reply = client.read1(Read1Request { addr }).await?.into_inner();

        match Rc::from_i32(reply.rc) {
            Some(Rc::Ok) => Ok(Slot {
                label: reply.label.unwrap_or_default(),
                value: reply.value,
            }),
            Some(Rc::Disabled) => Err(ReplicaError::Disabled(OpKind::Read1)),
            Some(rc) => {
                Err(ProtocolError::UnexpectedRc(format!("{:?}", rc), OpKind::Read1.to_string())
                    .into())
            }
            None => Err(ProtocolError::UnknownRc(reply.rc).into()),
        }
    }

    async fn read2(
        &self,
        addr: Address,
        label: Label,
        value: Value,
    ) -> Result<Adoption, ReplicaError> {
        let mut client = self.client.clone();
        let req: Read2Request = (addr, label, value).into();
        let reply = client.read2(req).await?.into_inner();
        adoption_of(OpKind::Read2, reply.rc)
    }

    async fn write(
        &self,
        addr: Address,
        label: Label,
        value: Value,
    ) -> Result<Adoption, ReplicaError> {
        let mut client = self.client.clone();
        let req: WriteRequest = (addr, label, value).into();
        let reply = client.write(req).await?.into_inner();
        adoption_of(OpKind::Write, reply.rc)
    }

    async fn enable(&self, caps: Capabilities) -> Result<(), ReplicaError> {
        let mut client = self.client.clone();
        client
            .enable_requests(EnableRequest {
                write: caps.write,
                read1: caps.read1,
                read2: caps.read2,
            })
            .await?;
        Ok(())
    }

    async fn name(&self) -> Result<String, ReplicaError> {
        let mut client = self.client.clone();
        let reply = client.name(NameRequest {}).await?.into_inner();
        Ok(reply.name)
    }

    async fn exit(&self) -> Result<(), ReplicaError> {
        let mut client = self.client.clone();
        client.exit(ExitRequest {}).await?;
        Ok(())
    }
}

/// LocalReplica calls a store in the same process, without any network I/O.
#[derive(Clone)]
pub struct LocalReplica {
    endpoint: String,
    store: Arc<ReplicaStore>,
}

impl LocalReplica {
    pub fn new(store: Arc<ReplicaStore>) -> Self {
        LocalReplica {
            endpoint: format!("local://{}", store.name()),
            store,
        }
    }

    pub fn store(&self) -> &Arc<ReplicaStore> {
        &self.store
    }
}

#[tonic::async_trait]
impl ReplicaClient for LocalReplica {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn read1(&self, addr: Address) -> Result<Slot, ReplicaError> {
        Ok(self.store.read1(addr)?)
    }

    async fn read2(
        &self,
        addr: Address,
        label: Label,
        value: Value,
    ) -> Result<Adoption, ReplicaError> {
        Ok(self.store.read2(addr, label, value)?)
    }

    async fn write(
        &self,
        addr: Address,
        label: Label,
        value: Value,
    ) -> Result<Adoption, ReplicaError> {
        Ok(self.store.write(addr, label, value)?)
    }

    async fn enable(&self, caps: Capabilities) -> Result<(), ReplicaError> {
        self.store.enable(caps);
        Ok(())
    }

    async fn name(&self) -> Result<String, ReplicaError> {
        Ok(self.store.name().to_string())
    }

    /// An in-process store has no process to terminate.
    async fn exit(&self) -> Result<(), ReplicaError> {
        Ok(())
    }
}
