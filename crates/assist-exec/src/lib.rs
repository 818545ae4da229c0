pub mod adapters;
pub mod contracts;
pub mod error;
pub mod gateway;

pub use adapters::*;
pub use contracts::*;
pub use error::*;
pub use gateway::*;
