mod log_format;
pub use log_format::*;

mod setup;
pub use self::setup::*;
