//! Middleware for the API layer
//!
//! Both middlewares are `Transform`/`Service` pairs. The rate limiter is
//! registered outermost and resolves the caller identity itself, so its
//! per-user partitioning works on routes with or without the auth wrap.

pub mod auth;
pub mod rate_limit;

pub use auth::{AuthContext, JwtAuth};
pub use rate_limit::RateLimiter;
