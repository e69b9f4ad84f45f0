//! Access auditing: log recording, querying, and suspicious-access
//! classification.

pub mod auditor;
pub mod logs;

pub use auditor::{AccessAuditor, Classification};
pub use logs::AccessLogService;
