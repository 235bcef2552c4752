#[macro_use]
extern crate quick_error;

pub mod abdpb;
pub mod conf;
pub mod coordinator;
pub mod quorums;
pub mod replica;
pub mod service;
pub mod store;
pub mod testutil;

pub use conf::ClusterConf;
pub use conf::ConfError;
pub use coordinator::AbdError;
pub use coordinator::Coordinator;
pub use replica::ReplicaError;
pub use store::StoreError;
