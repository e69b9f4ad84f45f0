//! Share link entity.

pub mod model;

pub use model::{LinkStatus, NewShareLink, ShareLink, SharePermission};
