use std::sync::Arc;

use slog::{info, o, Logger};
use tokio::sync::Notify;
use tonic;
use tonic::{Request, Response, Status};

use crate::abdpb::AbdService;
use crate::abdpb::AbdServiceServer;
use crate::abdpb::EnableReply;
use crate::abdpb::EnableRequest;
use crate::abdpb::ExitReply;
use crate::abdpb::ExitRequest;
use crate::abdpb::NameReply;
use crate::abdpb::NameRequest;
use crate::abdpb::ProtocolError;
use crate::abdpb::Rc;
use crate::abdpb::Read1Reply;
use crate::abdpb::Read1Request;
use crate::abdpb::Read2Reply;
use crate::abdpb::Read2Request;
use crate::abdpb::WriteReply;
use crate::abdpb::WriteRequest;
use crate::abdpb::{Label, Value};
use crate::store::{Adoption, Capabilities, ReplicaStore, StoreError};

/// AbdReplica serves the register protocol of one replica store over gRPC.
pub struct AbdReplica {
    store: Arc<ReplicaStore>,
    exit: Arc<Notify>,
    logger: Logger,
}

impl AbdReplica {
    pub fn new(store: Arc<ReplicaStore>, exit: Arc<Notify>, logger: &Logger) -> Self {
        let logger = logger.new(o!("replica" => store.name().to_string()));
        AbdReplica {
            store,
            exit,
            logger,
        }
    }

    /// into_service wraps it into a tonic service to add to a `Server`.
    pub fn into_service(self) -> AbdServiceServer<AbdReplica> {
        AbdServiceServer::new(self)
    }
}

/// offered extracts the (label, value) carried by a read2 or write request.
fn offered(label: Option<Label>, value: Option<Value>) -> Result<(Label, Value), ProtocolError> {
    let label = label.ok_or(ProtocolError::LackOf("label".into()))?;
    let value = match value {
        Some(v) if v.kind.is_some() => v,
        _ => return Err(ProtocolError::LackOf("value".into())),
    };
    Ok((label, value))
}

fn adoption_rc(rst: Result<Adoption, StoreError>) -> Rc {
    match rst {
        Ok(Adoption::Adopted) => Rc::Ok,
        Ok(Adoption::Stale) => Rc::Stale,
        Err(StoreError::Disabled(_)) => Rc::Disabled,
    }
}

#[tonic::async_trait]
impl AbdService for AbdReplica {
    async fn read1(&self, request: Request<Read1Request>) -> Result<Response<Read1Reply>, Status> {
        let req = request.into_inner();

        let reply = match self.store.read1(req.addr) {
            Ok(slot) => Read1Reply {
                rc: Rc::Ok as i32,
                label: Some(slot.label),
                value: slot.value,
            },
            Err(StoreError::Disabled(_)) => Read1Reply {
                rc: Rc::Disabled as i32,
                ..Default::default()
            },
        };

        Ok(Response::new(reply))
    }

    async fn read2(&self, request: Request<Read2Request>) -> Result<Response<Read2Reply>, Status> {
        let req = request.into_inner();
        let (label, value) = offered(req.label, req.value)?;

        let rc = adoption_rc(self.store.read2(req.addr, label, value));
        Ok(Response::new(Read2Reply { rc: rc as i32 }))
    }

    async fn write(&self, request: Request<WriteRequest>) -> Result<Response<WriteReply>, Status> {
        let req = request.into_inner();
        let (label, value) = offered(req.label, req.value)?;

        let rc = adoption_rc(self.store.write(req.addr, label, value));
        Ok(Response::new(WriteReply { rc: rc as i32 }))
    }

    async fn enable_requests(
        &self,
        request: Request<EnableRequest>,
    ) -> Result<Response<EnableReply>, Status> {
        let req = request.into_inner();
        self.store
            .enable(Capabilities::new(req.write, req.read1, req.read2));
        Ok(Response::new(EnableReply {}))
    }

    async fn name(&self, _request: Request<NameRequest>) -> Result<Response<NameReply>, Status> {
        Ok(Response::new(NameReply {
            name: self.store.name().to_string(),
        }))
    }

    async fn exit(&self, _request: Request<ExitRequest>) -> Result<Response<ExitReply>, Status> {
        info!(self.logger, "exit requested");
        // the hosting server stops after this reply is sent.
        self.exit.notify_one();
        Ok(Response::new(ExitReply {}))
    }
}
