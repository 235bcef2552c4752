use std::time::Duration;

use crate::abdpb::OpKind;
use crate::abdpb::ProtocolError;
use crate::StoreError;

quick_error! {
    /// ReplicaError is an error talking to a single replica.
    /// For quorum counting every variant means the replica abstained.
    #[derive(Debug, Eq, PartialEq)]
    pub enum ReplicaError {
        /// The replica refused the operation by its capability mask.
        Disabled(op: OpKind) {
            display("{} is disabled", op)
        }

        Timeout(d: Duration) {
            display("no response in {:?}", d)
        }

        Unreachable(msg: String) {
            from(e: tonic::transport::Error) -> (format!("{}", e))
            display("unreachable: {}", msg)
        }

        Rpc(msg: String) {
            from(s: tonic::Status) -> (format!("{:?}: {}", s.code(), s.message()))
            display("rpc error: {}", msg)
        }

        BadReply(e: ProtocolError) {
            from(e: ProtocolError) -> (e)
            display("bad reply: {}", e)
        }

        /// The task running the request was cancelled or panicked.
        Internal(msg: String) {
            display("internal error: {}", msg)
        }
    }
}

impl From<StoreError> for ReplicaError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Disabled(op) => ReplicaError::Disabled(op),
        }
    }
}
