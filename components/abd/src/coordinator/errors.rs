use crate::abdpb::{Address, OpKind, ProtocolError};
use crate::conf::ConfError;
use crate::ReplicaError;

quick_error! {
    /// AbdError is a failed register operation.
    /// The register stays available for subsequent operations.
    #[derive(Debug)]
    pub enum AbdError {
        /// Fewer than a majority of replicas responded in a phase.
        NotEnoughQuorum(phase: OpKind, want: usize, got: usize) {
            display("{}: want at least {} replies, but:{}", phase, want, got)
        }

        /// No write has ever reached the replicas that responded.
        NotWritten(addr: Address) {
            display("address {} has no value", addr)
        }

        /// The greatest label stored at the address has no successor.
        LabelExhausted(addr: Address) {
            display("address {} has no label left to write with", addr)
        }

        /// The value to write is malformed.
        Protocol(e: ProtocolError) {
            from(e: ProtocolError) -> (e)
            display("{}", e)
        }

        Conf(e: ConfError) {
            from(e: ConfError) -> (e)
            display("{}", e)
        }

        Replica(e: ReplicaError) {
            from(e: ReplicaError) -> (e)
            display("{}", e)
        }
    }
}

impl PartialEq for AbdError {
    fn eq(&self, other: &AbdError) -> bool {
        match (self, other) {
            (Self::NotEnoughQuorum(a, b, c), Self::NotEnoughQuorum(x, y, z)) => {
                a == x && b == y && c == z
            }
            (Self::NotWritten(a), Self::NotWritten(b)) => a == b,
            (Self::LabelExhausted(a), Self::LabelExhausted(b)) => a == b,
            (Self::Protocol(a), Self::Protocol(b)) => a == b,
            (Self::Conf(a), Self::Conf(b)) => a == b,
            (Self::Replica(a), Self::Replica(b)) => a == b,
            _ => false,
        }
    }
}
