mod errors;
pub use errors::*;

mod harness;
pub use harness::*;

#[cfg(test)]
mod test_harness;
