use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use super::jwt::JwtKeys;
use crate::{error::AppError, state::AppState};

/// Verified bearer token; carries the email the token was issued for.
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);

        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        // Expect "Bearer <token>"
        let token = auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AppError::Unauthorized)?;

        let claims = keys.verify(token).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            AppError::Unauthorized
        })?;

        Ok(AuthUser(claims.email))
    }
}

/// Verified token whose user row carries the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub String);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(email) = AuthUser::from_request_parts(parts, state).await?;
        let user = state.store.find_user_by_email(&email).await?;
        match user {
            Some(u) if u.is_admin() => Ok(AdminUser(email)),
            _ => {
                warn!(%email, "admin access denied");
                Err(AppError::Forbidden)
            }
        }
    }
}

/// Route layer used when strict access control is switched on.
pub async fn require_admin(AdminUser(email): AdminUser, req: Request, next: Next) -> Response {
    debug!(%email, "admin access granted");
    next.run(req).await
}
