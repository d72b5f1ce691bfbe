//! HTTP surface for the ArenaOps token authority
//!
//! Thin Actix-web layer over the core token service: bearer-token
//! authentication with revocation checks, Redis-backed rate limiting, the
//! JWKS discovery document, and the refresh/logout routes.

pub mod app;
pub mod config;
pub mod middleware;
pub mod routes;
