use derive_more;

include!(concat!(env!("OUT_DIR"), "/abd.rs"));

mod display;
mod errors;
mod label;
mod values;

pub use abd_service_client::*;
pub use abd_service_server::*;
pub use errors::*;



#[cfg(test)]
mod test_label;

/// Address identifies one independent register.
pub type Address = i64;

/// WriterId breaks ties between labels chosen by different writers.
pub type WriterId = i64;

/// OpKind is one of the three data operations a replica serves.
/// Each of them can be disabled independently for fault injection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
    Read1,
    Read2,
    Write,
}

impl OpKind {
    pub fn all() -> Vec<OpKind> {
        vec![OpKind::Read1, OpKind::Read2, OpKind::Write]
    }
}

impl From<&OpKind> for &str {
    fn from(op: &OpKind) -> Self {
        match op {
            OpKind::Read1 => "read1",
            OpKind::Read2 => "read2",
            OpKind::Write => "write",
        }
    }
}

impl From<OpKind> for &str {
    fn from(op: OpKind) -> Self {
        (&op).into()
    }
}

impl From<(Address, Label, Value)> for Read2Request {
    fn from(t: (Address, Label, Value)) -> Read2Request {
        Read2Request {
            addr: t.0,
            label: Some(t.1),
            value: Some(t.2),
        }
    }
}

impl From<(Address, Label, Value)> for WriteRequest {
    fn from(t: (Address, Label, Value)) -> WriteRequest {
        WriteRequest {
            addr: t.0,
            label: Some(t.1),
            value: Some(t.2),
        }
    }
}
