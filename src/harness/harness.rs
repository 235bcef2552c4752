use std::future::Future;

use slog::{debug, info, warn, Logger};
use tokio::time::timeout;

use abd::abdpb::{Address, Label, Value};
use abd::coordinator::{bcast, oks, Coordinator};
use abd::quorums::{partitions, ReplicaSet};
use abd::store::{Capabilities, Slot};
use abd::ReplicaError;

use crate::HarnessError;

/// check_server_processes verifies that every replica serves the three data operations and
/// honors the capability mask.
pub async fn check_server_processes(c: &Coordinator, logger: &Logger) -> Result<(), HarnessError> {
    info!(logger, "checking that server operations are working");

    check_enable(c, logger, 1000).await?;
    check_enable(c, logger, 1001).await?;

    info!(logger, "enable is working on all processes");
    Ok(())
}

async fn check_enable(c: &Coordinator, logger: &Logger, addr: Address) -> Result<(), HarnessError> {
    debug!(logger, "seeding initial write"; "addr" => addr);
    check_write(c, addr, 10, 1, true).await?;

    debug!(logger, "everything disabled but read1");
    enable_all(c, Capabilities::new(false, true, false)).await?;
    check_write(c, addr, 11, 1, false).await?;
    check_read2(c, addr, 12, 2, false).await?;
    check_read1(c, addr, 10, 1, true).await?;

    debug!(logger, "everything disabled but read2");
    enable_all(c, Capabilities::new(false, false, true)).await?;
    check_read1(c, addr, 10, 1, false).await?;
    check_read2(c, addr, 13, 2, true).await?;
    check_write(c, addr, 14, 4, false).await?;

    debug!(logger, "everything enabled");
    enable_all(c, Capabilities::all()).await?;
    check_read1(c, addr, 13, 2, true).await?;
    check_read2(c, addr, 15, 5, true).await?;
    check_read1(c, addr, 15, 5, true).await?;
    check_write(c, addr, 16, 6, true).await?;
    check_read1(c, addr, 16, 6, true).await?;

    Ok(())
}

/// run_client_scenarios drives the register through partial failures of writes and reads.
/// It needs at least 3 replicas.
pub async fn run_client_scenarios(c: &Coordinator, logger: &Logger) -> Result<(), HarnessError> {
    let n = c.peers().len();
    if n < 3 {
        return Err(HarnessError::Check(format!(
            "at least 3 replicas are required, but:{}",
            n
        )));
    }
    let qs = partitions(n);

    enable_writes(c, &qs.all).await?;

    info!(logger, "testing basic read and write");
    expect_write(c, 17, 1717, true).await?;
    let label = max_label(c, 17).await;
    expect_read(c, 17, Some((label, 1717))).await?;
    expect_read(c, 18, None).await?;
    info!(logger, "PASSED");

    info!(logger, "testing with minority write failures");
    enable_writes(c, &qs.top_majority).await?;
    expect_write(c, 117, 1717, true).await?;
    let label = max_label(c, 117).await;
    expect_read(c, 117, Some((label, 1717))).await?;
    expect_read(c, 118, None).await?;
    expect_read(c, 118, None).await?;
    info!(logger, "PASSED");

    info!(logger, "testing with majority write failures");
    enable_writes(c, &qs.top_minority).await?;
    expect_write(c, 217, 2717, false).await?;
    info!(logger, "PASSED");

    info!(logger, "testing with minority read failures");
    // the read1 majority includes replicas the failed write reached
    enable_reads(c, &qs.top_majority, &qs.bottom_majority).await?;
    let label = max_label(c, 217).await;
    expect_read(c, 217, Some((label, 2717))).await?;
    info!(logger, "PASSED");

    info!(logger, "testing with single write");
    let last = &c.peers()[n - 1];
    bounded(c, last.write(218, Label::new(2, 0), Value::int(3))).await?;

    enable_reads(c, &qs.top_majority, &qs.bottom_minority).await?;
    expect_read(c, 218, None).await?;
    enable_reads(c, &qs.bottom_majority, &qs.top_minority).await?;
    expect_read(c, 218, None).await?;
    enable_reads(c, &qs.bottom_majority, &qs.inner_majority).await?;
    expect_read(c, 218, Some((Label::new(2, 0), 3))).await?;
    info!(logger, "PASSED");

    enable_all(c, Capabilities::all()).await?;
    Ok(())
}

/// shutdown_processes asks every replica to exit.
pub async fn shutdown_processes(c: &Coordinator, logger: &Logger) -> Result<(), HarnessError> {
    for p in c.peers().iter() {
        // a replica may terminate before its reply is sent
        match bounded(c, p.exit()).await {
            Ok(_) => info!(logger, "exit sent"; "replica" => p.endpoint()),
            Err(e) => warn!(logger, "exit"; "replica" => p.endpoint(), "err" => %e),
        }
    }
    Ok(())
}

/// bounded runs a single replica call with the per-call timeout of the coordinator.
async fn bounded<T, F>(c: &Coordinator, fut: F) -> Result<T, ReplicaError>
where
    F: Future<Output = Result<T, ReplicaError>>,
{
    match timeout(c.timeout(), fut).await {
        Ok(rst) => rst,
        Err(_) => Err(ReplicaError::Timeout(c.timeout())),
    }
}

async fn expect_write(
    c: &Coordinator,
    addr: Address,
    value: i64,
    want_success: bool,
) -> Result<(), HarnessError> {
    let rst = c.write(addr, Value::int(value)).await;
    if rst.is_ok() != want_success {
        return Err(HarnessError::Check(format!(
            "write {} {}: expected {} found {:?}",
            addr,
            value,
            if want_success { "success" } else { "failure" },
            rst
        )));
    }
    Ok(())
}

/// expect_read checks the result of a read. `None` expects the read to fail.
async fn expect_read(
    c: &Coordinator,
    addr: Address,
    want: Option<(Label, i64)>,
) -> Result<(), HarnessError> {
    let rst = c.read(addr).await;

    let ok = match (&want, &rst) {
        (None, Err(_)) => true,
        (Some((wl, wv)), Ok((l, v))) => wl == l && v.as_int() == Some(*wv),
        _ => false,
    };

    if !ok {
        return Err(HarnessError::Check(format!(
            "read {}: expected {} found {}",
            addr,
            match want {
                Some((l, v)) => format!("{}({})", v, l),
                None => "failed".to_string(),
            },
            match rst {
                Ok((l, v)) => format!("{}({})", v, l),
                Err(e) => format!("failed: {}", e),
            }
        )));
    }
    Ok(())
}

/// max_label returns the greatest label of `addr` among the replicas that respond to read1.
async fn max_label(c: &Coordinator, addr: Address) -> Label {
    let replies = bcast(c.peers(), &c.all(), c.timeout(), |p| async move {
        p.read1(addr).await
    })
    .await;

    let slots = oks(replies);
    Label::max_of(slots.iter().map(|(_, s)| &s.label))
}

/// enable_writes enables write only on `mask`; read1 and read2 are enabled everywhere.
async fn enable_writes(c: &Coordinator, mask: &ReplicaSet) -> Result<(), HarnessError> {
    for (i, p) in c.peers().iter().enumerate() {
        let caps = Capabilities::new(mask.contains(i), true, true);
        bounded(c, p.enable(caps)).await.map_err(|e| {
            HarnessError::Check(format!("failed enabling writes on {}: {}", p.endpoint(), e))
        })?;
    }
    Ok(())
}

/// enable_reads enables read1 on `r1` and read2 on `r2`; write is enabled everywhere.
async fn enable_reads(c: &Coordinator, r1: &ReplicaSet, r2: &ReplicaSet) -> Result<(), HarnessError> {
    for (i, p) in c.peers().iter().enumerate() {
        let caps = Capabilities::new(true, r1.contains(i), r2.contains(i));
        bounded(c, p.enable(caps)).await.map_err(|e| {
            HarnessError::Check(format!("failed enabling reads on {}: {}", p.endpoint(), e))
        })?;
    }
    Ok(())
}

async fn enable_all(c: &Coordinator, caps: Capabilities) -> Result<(), HarnessError> {
    let replies = bcast(c.peers(), &c.all(), c.timeout(), |p| async move {
        p.enable(caps).await
    })
    .await;

    let present = ok_set(&replies);
    if present.len() != c.peers().len() {
        return Err(HarnessError::Check(format!(
            "these processes do not support enable: {}",
            names(c, &c.all().difference(&present))
        )));
    }
    Ok(())
}

async fn check_write(
    c: &Coordinator,
    addr: Address,
    seq: i64,
    value: i64,
    want_success: bool,
) -> Result<(), HarnessError> {
    let label = Label::new(seq, 0);
    let replies = bcast(c.peers(), &c.all(), c.timeout(), |p| async move {
        p.write(addr, label, Value::int(value)).await
    })
    .await;

    expect_responses(c, "write", &ok_set(&replies), want_success)
}

async fn check_read2(
    c: &Coordinator,
    addr: Address,
    seq: i64,
    value: i64,
    want_success: bool,
) -> Result<(), HarnessError> {
    let label = Label::new(seq, 0);
    let replies = bcast(c.peers(), &c.all(), c.timeout(), |p| async move {
        p.read2(addr, label, Value::int(value)).await
    })
    .await;

    expect_responses(c, "read2", &ok_set(&replies), want_success)
}

async fn check_read1(
    c: &Coordinator,
    addr: Address,
    seq: i64,
    value: i64,
    want_response: bool,
) -> Result<(), HarnessError> {
    let replies = bcast(c.peers(), &c.all(), c.timeout(), |p| async move {
        p.read1(addr).await
    })
    .await;

    let present = ok_set(&replies);
    expect_responses(c, "read1", &present, want_response)?;

    let want = Slot::new(Label::new(seq, 0), Value::int(value));
    for (i, slot) in oks(replies) {
        if slot != want {
            return Err(HarnessError::Check(format!(
                "{} returned bad response: {:?}",
                c.peers()[i].endpoint(),
                slot
            )));
        }
    }
    Ok(())
}

/// expect_responses checks that either every replica or none of them served `op`.
fn expect_responses(
    c: &Coordinator,
    op: &str,
    present: &ReplicaSet,
    want_all: bool,
) -> Result<(), HarnessError> {
    if want_all && present.len() != c.peers().len() {
        return Err(HarnessError::Check(format!(
            "these processes do not support basic {}: {}",
            op,
            names(c, &c.all().difference(present))
        )));
    }

    if !want_all && !present.is_empty() {
        return Err(HarnessError::Check(format!(
            "these processes ignored {} disable: {}",
            op,
            names(c, present)
        )));
    }
    Ok(())
}

fn ok_set<T, E>(replies: &[(usize, Result<T, E>)]) -> ReplicaSet {
    replies
        .iter()
        .filter(|(_, r)| r.is_ok())
        .map(|(i, _)| *i)
        .collect()
}

fn names(c: &Coordinator, set: &ReplicaSet) -> String {
    set.iter()
        .map(|i| c.peers()[i].endpoint().to_string())
        .collect::<Vec<_>>()
        .join(",")
}
