#[macro_use]
extern crate quick_error;

pub mod harness;
pub mod server;
pub mod setup;

pub use harness::HarnessError;
pub use server::Server;
pub use server::ServerError;
pub use setup::new_logger;
pub use setup::LogConfig;
