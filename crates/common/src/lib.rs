//! Error-context plumbing and small helpers shared by all mediahost crates.

pub mod error;
pub mod time;

pub use error::FromMessage;
