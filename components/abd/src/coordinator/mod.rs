mod broadcast;
pub use broadcast::*;

mod errors;
pub use errors::*;

mod coordinator;
pub use coordinator::*;
