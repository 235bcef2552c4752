use std::mem::replace;
use std::net::SocketAddr;
use std::sync::Arc;

use slog::{info, o, Logger};
use tokio::sync::oneshot::{self, Sender};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use abd::service::AbdReplica;
use abd::store::ReplicaStore;

use crate::ServerError;

/// Server serves one replica over gRPC until it is stopped or a client asks it to exit.
pub struct Server {
    name: String,
    listen_addr: SocketAddr,
    store: Arc<ReplicaStore>,
    exit: Arc<Notify>,
    stop_tx: Option<Sender<()>>,
    join_handle: Option<JoinHandle<Result<(), ServerError>>>,
    logger: Logger,
}

impl Server {
    /// new creates a server of an empty replica.
    ///
    /// `listen_addr` is `host:port`, or a port to listen on all interfaces.
    pub fn new(name: &str, listen_addr: &str, logger: &Logger) -> Result<Server, ServerError> {
        let listen_addr = parse_listen_addr(listen_addr)?;
        let logger = logger.new(o!("server" => name.to_string()));

        Ok(Server {
            name: name.to_string(),
            listen_addr,
            store: Arc::new(ReplicaStore::new(name, &logger)),
            exit: Arc::new(Notify::new()),
            stop_tx: None,
            join_handle: None,
            logger,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn listen_addr(&self) -> SocketAddr {
        self.listen_addr
    }

    pub fn store(&self) -> &Arc<ReplicaStore> {
        &self.store
    }

    /// Starts the replica service in a tokio task.
    /// It must be called inside a tokio runtime.
    pub fn start(&mut self) {
        let (tx, rx) = oneshot::channel::<()>();

        let replica = AbdReplica::new(self.store.clone(), self.exit.clone(), &self.logger);
        let s = tonic::transport::Server::builder().add_service(replica.into_service());

        let addr = self.listen_addr;
        let exit = self.exit.clone();
        let logger = self.logger.clone();

        let j = tokio::spawn(async move {
            info!(logger, "serving"; "addr" => %addr);

            let sig_logger = logger.clone();
            let rst = s
                .serve_with_shutdown(addr, async move {
                    tokio::select! {
                        _ = rx => {
                            info!(sig_logger, "stop signal received");
                        }
                        _ = exit.notified() => {
                            info!(sig_logger, "exit requested by client");
                        }
                    }
                })
                .await;

            info!(logger, "server stopped"; "rst" => ?rst);
            rst.map_err(ServerError::from)
        });

        self.stop_tx = Some(tx);
        self.join_handle = Some(j);
    }

    pub fn stop(&mut self) -> Result<(), ServerError> {
        if let Some(tx) = self.stop_tx.take() {
            tx.send(()).or(Err(ServerError::RxClosed))?;
            info!(self.logger, "stop signal sent");
        }
        Ok(())
    }

    /// join waits for the server to terminate, by `stop()` or by an Exit request.
    pub async fn join(&mut self) -> Result<(), ServerError> {
        let j = replace(&mut self.join_handle, None);
        j.ok_or(ServerError::NotStarted)?.await?
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

fn parse_listen_addr(addr: &str) -> Result<SocketAddr, ServerError> {
    if let Ok(port) = addr.parse::<u16>() {
        return Ok(SocketAddr::from(([0, 0, 0, 0], port)));
    }
    addr.parse::<SocketAddr>()
        .or_else(|_| Err(ServerError::BadAddr(addr.to_string())))
}
