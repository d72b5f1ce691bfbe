//! Repository traits for domain entity persistence

pub mod token;

pub use token::{MockTokenRepository, TokenRepository};
