//! JWT authentication middleware for protecting API endpoints.
//!
//! Extracts the bearer token from the Authorization header, validates it
//! cryptographically, then checks the blacklist. The two failure modes are
//! distinguished on the wire: a token that fails validation yields
//! `TOKEN_INVALID` with a deliberately generic message, while a token that
//! validates but was revoked yields `TOKEN_REVOKED`.
//!
//! The blacklist check fails open: if the store is unreachable the request
//! proceeds on the strength of the signature alone, with an error log.

use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll};

use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::error::InternalError;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use futures_util::future::LocalBoxFuture;
use uuid::Uuid;

use arena_core::domain::entities::token::Claims;
use arena_core::errors::TokenError;
use arena_core::repositories::TokenRepository;
use arena_core::services::blacklist::TokenBlacklist;
use arena_core::services::token::TokenService;
use arena_shared::types::response::{error_codes, ApiResponse};

/// User authentication context injected into request extensions
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// User ID from the `sub` claim
    pub user_id: Uuid,
    /// Email address of the authenticated user
    pub email: String,
    /// Role names granted to the user
    pub roles: Vec<String>,
    /// JWT ID, used for revocation
    pub jti: String,
    /// Natural expiry of the presented access token
    pub expires_at: DateTime<Utc>,
}

impl AuthContext {
    /// Builds a context from validated claims
    fn from_claims(claims: Claims) -> Result<Self, TokenError> {
        let user_id = claims.user_id().map_err(|_| TokenError::InvalidToken)?;
        let expires_at = claims.expires_at();
        Ok(Self {
            user_id,
            email: claims.email,
            roles: claims.roles,
            jti: claims.jti,
            expires_at,
        })
    }
}

/// Access token verification, object-safe so the middleware does not need
/// the repository type parameter
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Claims, TokenError>;
}

impl<R: TokenRepository> TokenVerifier for TokenService<R> {
    fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate_access_token(token)
    }
}

/// JWT authentication middleware factory
pub struct JwtAuth {
    verifier: Arc<dyn TokenVerifier>,
    blacklist: Arc<dyn TokenBlacklist>,
}

impl JwtAuth {
    /// Creates the middleware around a verifier and a blacklist store
    pub fn new(verifier: Arc<dyn TokenVerifier>, blacklist: Arc<dyn TokenBlacklist>) -> Self {
        Self {
            verifier,
            blacklist,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
            verifier: self.verifier.clone(),
            blacklist: self.blacklist.clone(),
        }))
    }
}

/// JWT authentication middleware service
pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
    verifier: Arc<dyn TokenVerifier>,
    blacklist: Arc<dyn TokenBlacklist>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let verifier = self.verifier.clone();
        let blacklist = self.blacklist.clone();

        Box::pin(async move {
            let token = match extract_bearer_token(&req) {
                Some(token) => token,
                None => {
                    return Err(unauthorized(
                        error_codes::UNAUTHORIZED,
                        "Missing or invalid Authorization header",
                    ));
                }
            };

            // Cryptographic validation first; the blacklist only matters for
            // tokens that would otherwise be accepted. Every validation
            // failure gets the same generic message so a probing client
            // cannot tell which check rejected the token.
            let claims = match verifier.verify(&token) {
                Ok(claims) => claims,
                Err(_) => {
                    return Err(unauthorized(error_codes::TOKEN_INVALID, "Invalid token"));
                }
            };

            match blacklist.is_blacklisted(&claims.jti).await {
                Ok(true) => {
                    return Err(unauthorized(
                        error_codes::TOKEN_REVOKED,
                        "Token has been revoked",
                    ));
                }
                Ok(false) => {}
                Err(e) => {
                    // Fail open: a down store must not lock every user out
                    log::error!("blacklist check failed, allowing request: {e}");
                }
            }

            let context = match AuthContext::from_claims(claims) {
                Ok(context) => context,
                Err(_) => {
                    return Err(unauthorized(error_codes::TOKEN_INVALID, "Invalid token"));
                }
            };
            req.extensions_mut().insert(context);

            service.call(req).await
        })
    }
}

/// Builds a 401 with the standard error envelope
fn unauthorized(code: &str, message: &str) -> Error {
    let response =
        HttpResponse::Unauthorized().json(ApiResponse::<()>::error(code, message));
    InternalError::from_response(message.to_string(), response).into()
}

/// Extracts the bearer token from the Authorization header
pub(crate) fn extract_bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|s| s.to_string())
}

/// Extractor for required authentication
impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| {
                unauthorized(error_codes::UNAUTHORIZED, "Authentication required")
            });

        ready(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bearer_token() {
        use actix_web::test;

        let req = test::TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer test_token_123"))
            .to_srv_request();
        assert_eq!(extract_bearer_token(&req), Some("test_token_123".to_string()));

        let req_no_bearer = test::TestRequest::default()
            .insert_header((AUTHORIZATION, "test_token_123"))
            .to_srv_request();
        assert_eq!(extract_bearer_token(&req_no_bearer), None);

        let req_no_header = test::TestRequest::default().to_srv_request();
        assert_eq!(extract_bearer_token(&req_no_header), None);
    }
}
