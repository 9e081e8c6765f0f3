pub mod error;
pub mod types;

pub use error::{SprintlensError, SprintlensResult};
