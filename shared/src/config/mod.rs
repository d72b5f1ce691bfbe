//! Configuration modules for the ArenaOps backend
//!
//! Each config struct ships production defaults via `Default` and an
//! environment-variable loader via `from_env()`. The binary entrypoint is
//! responsible for loading `.env` files before calling the loaders.

pub mod auth;
pub mod cache;
pub mod database;
pub mod rate_limit;
