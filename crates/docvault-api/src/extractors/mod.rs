//! Axum extractors: upstream-auth principal, client network metadata,
//! and pagination query parameters.

pub mod auth;
pub mod client;
pub mod pagination;

pub use auth::AuthOwner;
pub use client::ClientInfo;
pub use pagination::PaginationParams;
