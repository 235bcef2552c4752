mod client;
pub use client::*;

mod errors;
pub use errors::*;
