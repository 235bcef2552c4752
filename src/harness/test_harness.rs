use std::time::Duration;

use abd::abdpb::{Label, Value};
use abd::store::{Capabilities, Slot};
use abd::testutil::{local_cluster, test_logger, LocalCluster};
use abd::Coordinator;

use crate::harness::*;

#[cfg(test)]
use pretty_assertions::assert_eq;

#[tokio::test]
async fn test_check_server_processes() {
    let cluster = LocalCluster::new(5);
    let c = cluster.coordinator(1);

    check_server_processes(&c, &test_logger()).await.unwrap();

    for sto in cluster.stores.iter() {
        assert_eq!(
            Slot::new(Label::new(16, 0), Value::int(6)),
            sto.read1(1000).unwrap()
        );
        assert_eq!(
            Slot::new(Label::new(16, 0), Value::int(6)),
            sto.read1(1001).unwrap()
        );
        assert_eq!(Capabilities::all(), sto.capabilities());
    }
}

#[tokio::test]
async fn test_check_server_processes_names_bad_replica() {
    let cluster = LocalCluster::new(3);
    cluster.stores[2].enable(Capabilities::none());

    let c = cluster.coordinator(1);
    let rst = check_server_processes(&c, &test_logger()).await;

    match rst {
        Err(HarnessError::Check(msg)) => {
            assert_eq!("these processes do not support basic write: local://r2", msg)
        }
        _ => panic!("expect check error, but: {:?}", rst),
    }
}

#[tokio::test]
async fn test_run_client_scenarios() {
    for n in 3..8 {
        let cluster = LocalCluster::new(n);
        let c = cluster.coordinator(1);

        run_client_scenarios(&c, &test_logger()).await.unwrap();

        // the single direct write ended up on a majority
        let holders = cluster
            .stores
            .iter()
            .filter(|s| s.read1(218).unwrap().label == Label::new(2, 0))
            .count();
        assert!(holders >= n / 2 + 1, "n={} holders={}", n, holders);
    }
}

#[tokio::test]
async fn test_run_client_scenarios_too_few_replicas() {
    let cluster = LocalCluster::new(2);
    let c = cluster.coordinator(1);

    let rst = run_client_scenarios(&c, &test_logger()).await;
    match rst {
        Err(HarnessError::Check(msg)) => {
            assert_eq!("at least 3 replicas are required, but:2", msg)
        }
        _ => panic!("expect check error, but: {:?}", rst),
    }
}

#[tokio::test]
async fn test_shutdown_processes_local() {
    let cluster = local_cluster(3);
    let c = cluster.coordinator(1);

    shutdown_processes(&c, &test_logger()).await.unwrap();
}

#[tokio::test]
async fn test_harness_unresponsive_replica() {
    let mut cluster = LocalCluster::new(3);
    cluster.slow_down(2, Duration::from_secs(10));

    let c = Coordinator::new(
        1,
        cluster.peers.clone(),
        Duration::from_millis(100),
        &test_logger(),
    );
    let logger = test_logger();
    let limit = Duration::from_secs(3);

    let rst = tokio::time::timeout(limit, run_client_scenarios(&c, &logger))
        .await
        .unwrap();
    match rst {
        Err(HarnessError::Check(msg)) => assert_eq!(
            "failed enabling writes on local://r2: no response in 100ms",
            msg
        ),
        _ => panic!("expect check error, but: {:?}", rst),
    }

    let rst = tokio::time::timeout(limit, check_server_processes(&c, &logger))
        .await
        .unwrap();
    match rst {
        Err(HarnessError::Check(msg)) => assert_eq!(
            "these processes do not support basic write: local://r2",
            msg
        ),
        _ => panic!("expect check error, but: {:?}", rst),
    }

    tokio::time::timeout(limit, shutdown_processes(&c, &logger))
        .await
        .unwrap()
        .unwrap();
}
