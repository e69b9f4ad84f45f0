//! # docvault-core
//!
//! Core building blocks shared by every DocVault crate: the unified
//! [`error::AppError`] type, typed configuration loaded from TOML,
//! pagination types, and domain events emitted towards the notifier.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
