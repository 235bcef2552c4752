mod errors;
pub use errors::*;

mod server;
pub use server::*;

#[cfg(test)]
mod test_server;
