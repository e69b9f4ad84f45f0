//! # docvault-entity
//!
//! Domain entity models for DocVault: share links and access log entries.
//! Entities are plain data plus pure derivation functions; all mutation
//! goes through the service layer.

pub mod access;
pub mod share;

pub use access::{AccessAction, AccessLogEntry, AccessLogFilter, ActorIdentity, NewAccessLogEntry};
pub use share::{LinkStatus, NewShareLink, ShareLink, SharePermission};
