use std::cmp;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use slog::{debug, info, o, warn, Logger};

use crate::abdpb::{Address, Label, OpKind, ProtocolError, Value, WriterId};
use crate::conf::ClusterConf;
use crate::coordinator::{bcast, Peer};
use crate::quorums::{quorum, ReplicaSet};
use crate::replica::RemoteReplica;
use crate::store::{Adoption, Slot};
use crate::{AbdError, ReplicaError};

/// Coordinator runs the two ABD operations, read and write, against a set of replicas.
///
/// It keeps no register state: everything durable lives on the replicas. A majority is always
/// computed over all configured replicas, even when an operation only targets a subset.
pub struct Coordinator {
    writer_id: WriterId,
    peers: Vec<Peer>,
    timeout: Duration,

    /// The greatest label seq this coordinator has issued.
    /// Concurrent writes through one coordinator never share a label.
    last_seq: AtomicI64,

    logger: Logger,
}

impl Coordinator {
    pub fn new(writer_id: WriterId, peers: Vec<Peer>, timeout: Duration, logger: &Logger) -> Self {
        let logger = logger.new(o!("writer_id" => writer_id));
        Coordinator {
            writer_id,
            peers,
            timeout,
            last_seq: AtomicI64::new(0),
            logger,
        }
    }

    /// from_conf builds a coordinator with a lazily connected client for every replica.
    pub fn from_conf(conf: &ClusterConf, logger: &Logger) -> Result<Self, AbdError> {
        conf.check()?;

        let mut peers: Vec<Peer> = Vec::with_capacity(conf.replicas.len());
        for ep in conf.replicas.iter() {
            peers.push(Arc::new(RemoteReplica::connect_lazy(ep)?));
        }

        let writer_id = conf
            .writer_id
            .unwrap_or_else(rand::random::<WriterId>);

        Ok(Coordinator::new(writer_id, peers, conf.timeout(), logger))
    }

    pub fn writer_id(&self) -> WriterId {
        self.writer_id
    }

    pub fn peers(&self) -> &[Peer] {
        &self.peers
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// quorum is the number of responses every phase needs.
    pub fn quorum(&self) -> usize {
        quorum(self.peers.len())
    }

    pub fn all(&self) -> ReplicaSet {
        ReplicaSet::all(self.peers.len())
    }

    /// write stores `value` at `addr` and returns the label it is stored with.
    pub async fn write(&self, addr: Address, value: Value) -> Result<Label, AbdError> {
        self.write_via(addr, value, &self.all()).await
    }

    /// read returns the latest value at `addr` along with its label.
    pub async fn read(&self, addr: Address) -> Result<(Label, Value), AbdError> {
        self.read_via(addr, &self.all()).await
    }

    /// write_via is `write` that only sends requests to `targets`.
    ///
    /// 1. read the labels of a majority to choose a label greater than all of them;
    /// 2. send (label, value) to the replicas and wait for a majority to accept it.
    pub async fn write_via(
        &self,
        addr: Address,
        value: Value,
        targets: &ReplicaSet,
    ) -> Result<Label, AbdError> {
        if value.kind.is_none() {
            return Err(ProtocolError::LackOf("value".into()).into());
        }

        let slots = self.query(addr, targets).await?;

        let observed = Label::max_of(slots.iter().map(|(_, s)| &s.label));
        let label = self.next_label(addr, observed)?;

        debug!(self.logger, "write chose label";
               "addr" => addr, "observed" => %observed, "label" => %label);

        self.impose(OpKind::Write, addr, label, value.clone(), targets)
            .await?;

        info!(self.logger, "write done"; "addr" => addr, "label" => %label, "value" => %value);
        Ok(label)
    }

    /// read_via is `read` that only sends requests to `targets`.
    ///
    /// 1. read the slots of a majority and pick the one with the greatest label;
    /// 2. write it back to a majority before returning it, so that no later read returns an
    ///    older value. The write-back majority does not need to be the one of step 1.
    pub async fn read_via(
        &self,
        addr: Address,
        targets: &ReplicaSet,
    ) -> Result<(Label, Value), AbdError> {
        let slots = self.query(addr, targets).await?;

        let (from, latest) = select_latest(slots);
        let value = match latest.value {
            Some(v) if !latest.label.is_sentinel() => v,
            _ => {
                debug!(self.logger, "read found nothing"; "addr" => addr);
                return Err(AbdError::NotWritten(addr));
            }
        };

        debug!(self.logger, "read candidate";
               "addr" => addr, "label" => %latest.label, "from" => from);

        self.impose(OpKind::Read2, addr, latest.label, value.clone(), targets)
            .await?;

        info!(self.logger, "read done"; "addr" => addr, "label" => %latest.label, "value" => %value);
        Ok((latest.label, value))
    }

    /// next_label returns a label greater than `observed` and than any label this coordinator
    /// issued before. It fails if no greater seq exists.
    fn next_label(&self, addr: Address, observed: Label) -> Result<Label, AbdError> {
        let prev = self
            .last_seq
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                cmp::max(last, observed.seq).checked_add(1)
            })
            .map_err(|_| AbdError::LabelExhausted(addr))?;

        let floor = Label::new(prev, self.writer_id);
        cmp::max(observed, floor)
            .successor(self.writer_id)
            .ok_or(AbdError::LabelExhausted(addr))
    }

    /// query runs read1 on `targets` and returns the slots of the replicas that responded.
    async fn query(&self, addr: Address, targets: &ReplicaSet) -> Result<Vec<(usize, Slot)>, AbdError> {
        let replies = bcast(&self.peers, targets, self.timeout, |p| async move {
            p.read1(addr).await
        })
        .await;

        let slots = self.count_oks(OpKind::Read1, addr, replies);
        self.check_quorum(OpKind::Read1, slots.len())?;
        Ok(slots)
    }

    /// impose sends (label, value) with `op`, which is Write or Read2, and waits for a majority.
    async fn impose(
        &self,
        op: OpKind,
        addr: Address,
        label: Label,
        value: Value,
        targets: &ReplicaSet,
    ) -> Result<(), AbdError> {
        let replies = bcast(&self.peers, targets, self.timeout, |p| {
            let value = value.clone();
            async move {
                match op {
                    OpKind::Write => p.write(addr, label, value).await,
                    _ => p.read2(addr, label, value).await,
                }
            }
        })
        .await;

        let acks = self.count_oks(op, addr, replies);

        let stale = acks.iter().filter(|(_, a)| *a == Adoption::Stale).count();
        if stale > 0 {
            debug!(self.logger, "replicas already had the label or newer";
                   "op" => %op, "addr" => addr, "stale" => stale);
        }

        self.check_quorum(op, acks.len())
    }

    /// count_oks keeps successful replies and logs why the others abstained.
    fn count_oks<T>(
        &self,
        op: OpKind,
        addr: Address,
        replies: Vec<(usize, Result<T, ReplicaError>)>,
    ) -> Vec<(usize, T)> {
        let mut oks = Vec::with_capacity(replies.len());
        for (i, r) in replies {
            match r {
                Ok(v) => oks.push((i, v)),
                Err(e) => {
                    debug!(self.logger, "skipping replica";
                           "op" => %op, "addr" => addr,
                           "replica" => self.peers[i].endpoint(), "err" => %e);
                }
            }
        }
        oks
    }

    fn check_quorum(&self, op: OpKind, got: usize) -> Result<(), AbdError> {
        let want = self.quorum();
        if got < want {
            warn!(self.logger, "not enough replies"; "op" => %op, "want" => want, "got" => got);
            return Err(AbdError::NotEnoughQuorum(op, want, got));
        }
        Ok(())
    }
}

/// select_latest picks the slot with the greatest label.
/// Among equal labels the one from the lowest replica index wins.
///
/// `slots` must be ordered by replica index. An empty input yields a default slot.
pub fn select_latest(slots: Vec<(usize, Slot)>) -> (usize, Slot) {
    let mut best: Option<(usize, Slot)> = None;

    for (i, s) in slots {
        let better = match best {
            None => true,
            Some((_, ref b)) => s.label > b.label,
        };
        if better {
            best = Some((i, s));
        }
    }

    best.unwrap_or_default()
}
