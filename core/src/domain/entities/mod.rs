//! Domain entities

pub mod token;
pub mod user;

pub use token::{Claims, RefreshToken, TokenPair};
pub use user::UserIdentity;
