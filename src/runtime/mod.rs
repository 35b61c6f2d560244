pub mod codec;
pub mod error;

pub use codec::{StepResponseSender, StepResponseSource};
pub use error::Error;
