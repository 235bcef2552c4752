use std::sync::Arc;
use std::time::{Duration, Instant};

use slog::{o, Logger};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::sync::Notify;
use tokio::time::sleep;
use tonic::transport::Server;

use crate::abdpb::{Address, Label, Value};
use crate::conf::ClusterConf;
use crate::coordinator::{Coordinator, Peer};
use crate::quorums::ReplicaSet;
use crate::replica::{LocalReplica, ReplicaClient};
use crate::service::AbdReplica;
use crate::store::{Adoption, Capabilities, ReplicaStore, Slot};
use crate::ReplicaError;

/// test_logger drops every record.
pub fn test_logger() -> Logger {
    Logger::root(slog::Discard, o!())
}

pub fn local_cluster(replica_cnt: usize) -> LocalCluster {
    LocalCluster::new(replica_cnt)
}

/// LocalCluster is a set of in-process replicas, without network I/O.
pub struct LocalCluster {
    pub stores: Vec<Arc<ReplicaStore>>,
    pub peers: Vec<Peer>,
}

impl LocalCluster {
    pub fn new(replica_cnt: usize) -> Self {
        let logger = test_logger();

        let mut stores = vec![];
        let mut peers: Vec<Peer> = vec![];
        for i in 0..replica_cnt {
            let sto = Arc::new(ReplicaStore::new(format!("r{}", i), &logger));
            peers.push(Arc::new(LocalReplica::new(sto.clone())));
            stores.push(sto);
        }

        LocalCluster { stores, peers }
    }

    /// slow_down replaces replica `idx` with one that answers after `delay`.
    pub fn slow_down(&mut self, idx: usize, delay: Duration) {
        self.peers[idx] = Arc::new(SlowReplica {
            inner: LocalReplica::new(self.stores[idx].clone()),
            delay,
        });
    }

    pub fn coordinator(&self, writer_id: i64) -> Coordinator {
        Coordinator::new(
            writer_id,
            self.peers.clone(),
            Duration::from_millis(500),
            &test_logger(),
        )
    }

    /// enable_writes enables write on replicas in `mask` only. read1 and read2 are enabled
    /// everywhere.
    pub fn enable_writes(&self, mask: &ReplicaSet) {
        for (i, sto) in self.stores.iter().enumerate() {
            sto.enable(Capabilities::new(mask.contains(i), true, true));
        }
    }

    /// enable_reads enables read1 on `r1` and read2 on `r2`. write is enabled everywhere.
    pub fn enable_reads(&self, r1: &ReplicaSet, r2: &ReplicaSet) {
        for (i, sto) in self.stores.iter().enumerate() {
            sto.enable(Capabilities::new(true, r1.contains(i), r2.contains(i)));
        }
    }
}

/// SlowReplica delays every call to a local replica by `delay`.
pub struct SlowReplica {
    pub inner: LocalReplica,
    pub delay: Duration,
}

#[tonic::async_trait]
impl ReplicaClient for SlowReplica {
    fn endpoint(&self) -> &str {
        self.inner.endpoint()
    }

    async fn read1(&self, addr: Address) -> Result<Slot, ReplicaError> {
        sleep(self.delay).await;
        self.inner.read1(addr).await
    }

    async fn read2(
        &self,
        addr: Address,
        label: Label,
        value: Value,
    ) -> Result<Adoption, ReplicaError> {
        sleep(self.delay).await;
        self.inner.read2(addr, label, value).await
    }

    async fn write(
        &self,
        addr: Address,
        label: Label,
        value: Value,
    ) -> Result<Adoption, ReplicaError> {
        sleep(self.delay).await;
        self.inner.write(addr, label, value).await
    }

    async fn enable(&self, caps: Capabilities) -> Result<(), ReplicaError> {
        sleep(self.delay).await;
        self.inner.enable(caps).await
    }

    async fn name(&self) -> Result<String, ReplicaError> {
        sleep(self.delay).await;
        self.inner.name().await
    }

    async fn exit(&self) -> Result<(), ReplicaError> {
        sleep(self.delay).await;
        self.inner.exit().await
    }
}

/// TestCluster runs a gRPC replica server per address on localhost.
pub struct TestCluster {
    pub stores: Vec<Arc<ReplicaStore>>,
    pub exits: Vec<Arc<Notify>>,
    pub txs: Vec<oneshot::Sender<()>>,
    pub addrs: Vec<String>,
}

impl TestCluster {
    /// new creates a cluster listening on `base_port`, `base_port + 1`, ...
    /// Tests running in parallel must use distinct port ranges.
    pub fn new(base_port: u16, replica_cnt: usize) -> Self {
        let logger = test_logger();

        let mut stores = vec![];
        let mut addrs = vec![];
        for i in 0..replica_cnt {
            let addr = format!("127.0.0.1:{}", base_port as usize + i);
            stores.push(Arc::new(ReplicaStore::new(addr.clone(), &logger)));
            addrs.push(addr);
        }

        TestCluster {
            stores,
            exits: vec![],
            txs: vec![],
            addrs,
        }
    }

    pub async fn start(&mut self) {
        let logger = test_logger();

        for (addr, sto) in self.addrs.iter().zip(self.stores.iter()) {
            let (tx, rx) = oneshot::channel::<()>();
            let exit = Arc::new(Notify::new());

            let replica = AbdReplica::new(sto.clone(), exit.clone(), &logger);
            let s = Server::builder().add_service(replica.into_service());

            let sock_addr = addr.parse().unwrap();
            let ex = exit.clone();
            tokio::spawn(async move {
                s.serve_with_shutdown(sock_addr, async move {
                    tokio::select! {
                        _ = rx => {},
                        _ = ex.notified() => {},
                    }
                })
                .await
                .unwrap();
            });

            self.exits.push(exit);
            self.txs.push(tx);
        }

        for addr in self.addrs.iter() {
            assert!(
                wait_for_port(addr, Duration::from_secs(5)).await,
                "server not ready: {}",
                addr
            );
        }
    }

    pub fn conf(&self) -> ClusterConf {
        ClusterConf::from_endpoints(&self.addrs.join(",")).unwrap()
    }

    pub fn stop(&mut self) {
        while let Some(tx) = self.txs.pop() {
            // the server may have exited already
            let _ = tx.send(());
        }
    }
}

impl Drop for TestCluster {
    fn drop(&mut self) {
        self.stop()
    }
}

/// wait_for_port retries connecting to `addr` until it succeeds or `timeout` passes.
pub async fn wait_for_port(addr: &str, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if TcpStream::connect(addr).await.is_ok() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        sleep(Duration::from_millis(20)).await;
    }
}
