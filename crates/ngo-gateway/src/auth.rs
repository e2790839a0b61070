use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use ngo_core::TokenVerifier;

use crate::error::ApiError;

/// Token verifier shared through router state.
#[derive(Clone)]
pub struct AdminVerifier(pub Arc<dyn TokenVerifier>);

/// Extractor that rejects the request unless it carries a valid
/// `Authorization: Bearer <token>` header.
///
/// ```rust,ignore
/// async fn handler(_admin: RequireAdmin) -> &'static str {
///     "ok"
/// }
/// ```
pub struct RequireAdmin;

impl<S> FromRequestParts<S> for RequireAdmin
where
    AdminVerifier: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or_else(ApiError::unauthorized)?;

        let AdminVerifier(verifier) = AdminVerifier::from_ref(state);
        if !verifier.verify(token) {
            return Err(ApiError::unauthorized());
        }
        Ok(Self)
    }
}
