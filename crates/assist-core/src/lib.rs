pub mod actions;
pub mod calendar;
pub mod config;
pub mod error;
pub mod persistence;
pub mod reducer;
pub mod session;
pub mod state;
pub mod streak;

pub use actions::*;
pub use reducer::*;
pub use state::*;

pub use error::*;
pub use persistence::*;
