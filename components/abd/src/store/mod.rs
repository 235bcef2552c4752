mod store;
pub use store::*;

mod errors;
pub use errors::*;

#[cfg(test)]
mod test_store;
