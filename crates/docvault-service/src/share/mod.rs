//! Share link lifecycle: token issuance and the share link service.

pub mod service;
pub mod token;

pub use service::{ConsumeRequest, CreateShareLinkRequest, ShareLinkService, ShareLinkView};
pub use token::TokenIssuer;
