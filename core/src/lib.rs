//! # Core Domain Layer
//!
//! Business logic for the ArenaOps authentication service:
//! - JWT access token issuance and validation (RS256)
//! - Opaque refresh tokens with single-use rotation
//! - Token revocation via a pluggable blacklist
//! - RSA signing key bootstrap and JWKS export
//!
//! Persistence and the shared key-value store are abstracted behind traits;
//! concrete implementations live in the infrastructure layer.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

pub use errors::{DomainError, DomainResult, TokenError};
