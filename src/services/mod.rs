//! Service layer for business logic
//!
//! Share issuance and resolution live here so the HTTP handlers and the CLI
//! run exactly the same checks.

pub mod rate_limiter;
mod share_service;
pub mod slug;

pub use rate_limiter::{RateLimitDecision, RateLimiter};
pub use share_service::*;
pub use slug::{RandomSlugGenerator, SlugGenerator};
