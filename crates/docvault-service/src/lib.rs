//! # docvault-service
//!
//! Business logic service layer for DocVault. Each service orchestrates
//! the store contracts, password hashing, and the notifier boundary to
//! implement application-level use cases.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod audit;
pub mod context;
pub mod device;
pub mod notify;
pub mod password;
pub mod share;

pub use audit::{AccessAuditor, AccessLogService, Classification};
pub use context::{AccessorContext, OwnerContext};
pub use notify::{LogNotifier, Notifier};
pub use password::PasswordHasher;
pub use share::{
    ConsumeRequest, CreateShareLinkRequest, ShareLinkService, ShareLinkView, TokenIssuer,
};
