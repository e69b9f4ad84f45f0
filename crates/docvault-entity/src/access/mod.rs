//! Access log entity and query filter.

pub mod filter;
pub mod model;

pub use filter::AccessLogFilter;
pub use model::{AccessAction, AccessLogEntry, ActorIdentity, NewAccessLogEntry};
