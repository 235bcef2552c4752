use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use slog::{debug, info, o, Logger};

use crate::abdpb::{Address, Label, OpKind, Value};
use crate::StoreError;

/// Slot is what a replica stores for one address.
/// A never written address has the sentinel label and no value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Slot {
    pub label: Label,
    pub value: Option<Value>,
}

impl Slot {
    pub fn new(label: Label, value: Value) -> Self {
        Slot {
            label,
            value: Some(value),
        }
    }
}

/// Adoption is the outcome of offering a (label, value) to a replica.
/// Both of them are successful responses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Adoption {
    /// The offered label was newer and replaced the stored one.
    Adopted,
    /// The offered label was not newer; the slot is unchanged.
    Stale,
}

/// Capabilities tells which operations a replica responds to.
/// It is only used to inject failures in tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    pub write: bool,
    pub read1: bool,
    pub read2: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Capabilities::all()
    }
}

impl Capabilities {
    pub fn new(write: bool, read1: bool, read2: bool) -> Self {
        Capabilities {
            write,
            read1,
            read2,
        }
    }

    pub fn all() -> Self {
        Capabilities::new(true, true, true)
    }

    pub fn none() -> Self {
        Capabilities::new(false, false, false)
    }

    pub fn allows(&self, op: OpKind) -> bool {
        match op {
            OpKind::Read1 => self.read1,
            OpKind::Read2 => self.read2,
            OpKind::Write => self.write,
        }
    }
}

/// ReplicaStore holds the register slots of one replica.
///
/// The label of a slot never decreases: a (label, value) is adopted only if its label is
/// greater than the stored one.
pub struct ReplicaStore {
    name: String,
    slots: Mutex<HashMap<Address, Slot>>,
    caps: RwLock<Capabilities>,
    logger: Logger,
}

impl ReplicaStore {
    pub fn new<S: Into<String>>(name: S, logger: &Logger) -> Self {
        let name = name.into();
        let logger = logger.new(o!("replica" => name.clone()));
        ReplicaStore {
            name,
            slots: Mutex::new(HashMap::new()),
            caps: RwLock::new(Capabilities::all()),
            logger,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capabilities(&self) -> Capabilities {
        *self.caps.read().unwrap_or_else(|e| e.into_inner())
    }

    /// enable replaces all three capability flags at once.
    pub fn enable(&self, caps: Capabilities) {
        let mut c = self.caps.write().unwrap_or_else(|e| e.into_inner());
        *c = caps;
        info!(self.logger, "capabilities changed";
              "write" => caps.write, "read1" => caps.read1, "read2" => caps.read2);
    }

    /// read1 returns the current content of the slot at `addr`.
    pub fn read1(&self, addr: Address) -> Result<Slot, StoreError> {
        self.check(OpKind::Read1)?;

        let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        let slot = slots.get(&addr).cloned().unwrap_or_default();

        debug!(self.logger, "read1"; "addr" => addr, "label" => %slot.label);
        Ok(slot)
    }

    /// read2 is the write-back phase of a read.
    pub fn read2(&self, addr: Address, label: Label, value: Value) -> Result<Adoption, StoreError> {
        self.adopt(OpKind::Read2, addr, label, value)
    }

    pub fn write(&self, addr: Address, label: Label, value: Value) -> Result<Adoption, StoreError> {
        self.adopt(OpKind::Write, addr, label, value)
    }

    fn check(&self, op: OpKind) -> Result<(), StoreError> {
        if self.capabilities().allows(op) {
            Ok(())
        } else {
            debug!(self.logger, "refused"; "op" => %op);
            Err(StoreError::Disabled(op))
        }
    }

    fn adopt(
        &self,
        op: OpKind,
        addr: Address,
        label: Label,
        value: Value,
    ) -> Result<Adoption, StoreError> {
        self.check(op)?;

        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        let stored = slots.get(&addr).map(|s| s.label).unwrap_or_default();

        if label > stored {
            debug!(self.logger, "adopted";
                   "op" => %op, "addr" => addr, "from" => %stored, "to" => %label);
            slots.insert(addr, Slot::new(label, value));
            Ok(Adoption::Adopted)
        } else {
            debug!(self.logger, "stale adoption skipped";
                   "op" => %op, "addr" => addr, "stored" => %stored, "offered" => %label);
            Ok(Adoption::Stale)
        }
    }

    /// len returns the number of addresses that have been written.
    pub fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
