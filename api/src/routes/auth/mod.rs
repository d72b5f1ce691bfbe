//! Authentication routes

pub mod logout;
pub mod refresh;

use std::sync::Arc;

use arena_core::repositories::TokenRepository;
use arena_core::services::blacklist::TokenBlacklist;
use arena_core::services::directory::UserDirectory;
use arena_core::services::token::TokenService;

pub use logout::logout;
pub use refresh::refresh_token;

/// Shared application state for the auth routes
pub struct AppState<R: TokenRepository> {
    /// Token issuance, validation, and rotation
    pub token_service: Arc<TokenService<R>>,
    /// Access token revocation store
    pub blacklist: Arc<dyn TokenBlacklist>,
    /// Lookup into the platform's account store
    pub directory: Arc<dyn UserDirectory>,
}
