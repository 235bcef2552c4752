mod quorums;
pub use quorums::*;

#[cfg(test)]
mod test_quorums;
