use std::time::Duration;

use abd::abdpb::{Label, Value};
use abd::replica::{RemoteReplica, ReplicaClient};
use abd::store::Slot;
use abd::testutil::{test_logger, wait_for_port};

use crate::server::*;

#[cfg(test)]
use pretty_assertions::assert_eq;

#[test]
fn test_server_bad_addr() {
    let logger = test_logger();

    let rst = Server::new("r0", "foo:bar", &logger);
    assert_eq!(
        Err(ServerError::BadAddr("foo:bar".to_string())),
        rst.map(|_| ())
    );

    let s = Server::new("r0", "5001", &logger).unwrap();
    assert_eq!("0.0.0.0:5001", s.listen_addr().to_string());
    assert_eq!("r0", s.name());
}

#[tokio::test]
async fn test_server_join_not_started() {
    let mut s = Server::new("r0", "127.0.0.1:17200", &test_logger()).unwrap();
    assert_eq!(Err(ServerError::NotStarted), s.join().await);

    // stop before start is a no-op
    assert_eq!(Ok(()), s.stop());
}

#[tokio::test]
async fn test_server_start_stop() {
    let addr = "127.0.0.1:17201";
    let mut s = Server::new("r1", addr, &test_logger()).unwrap();
    s.start();
    assert!(wait_for_port(addr, Duration::from_secs(5)).await);

    let r = RemoteReplica::connect_lazy(addr).unwrap();
    assert_eq!("r1", r.name().await.unwrap());

    r.write(17, Label::new(1, 1), Value::int(1717)).await.unwrap();
    assert_eq!(
        Slot::new(Label::new(1, 1), Value::int(1717)),
        s.store().read1(17).unwrap()
    );

    s.stop().unwrap();
    s.join().await.unwrap();

    // a second stop has nothing to signal
    assert_eq!(Ok(()), s.stop());
}

#[tokio::test]
async fn test_server_exit_request() {
    let addr = "127.0.0.1:17202";
    let mut s = Server::new("r2", addr, &test_logger()).unwrap();
    s.start();
    assert!(wait_for_port(addr, Duration::from_secs(5)).await);

    let r = RemoteReplica::connect_lazy(addr).unwrap();
    let _ = r.exit().await;

    let rst = tokio::time::timeout(Duration::from_secs(5), s.join()).await;
    assert_eq!(Ok(Ok(())), rst.map_err(|_| "timeout"));

    assert_eq!(Err(ServerError::RxClosed), s.stop());
}
