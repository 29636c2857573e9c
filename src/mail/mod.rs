mod error;
mod mailbox;
mod threading;
mod types;

pub use error::*;
pub use mailbox::*;
pub use types::*;
