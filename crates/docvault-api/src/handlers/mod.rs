//! HTTP request handlers, organized by route group.

pub mod health;
pub mod logs;
pub mod share;
pub mod shared;
