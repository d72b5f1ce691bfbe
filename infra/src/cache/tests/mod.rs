//! Unit tests for the cache module
//!
//! Anything that needs a live Redis lives in the crate-level integration
//! tests and is `#[ignore]`d; these run offline.

mod redis_client_tests;
