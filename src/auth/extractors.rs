use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{error, warn};

use crate::{auth::cookie, error::AppError, state::AppState, users::dto::PublicUser};

/// Identity resolved from the session cookie. Extracting it is the gate in
/// front of every protected handler: cookie present, token valid, user still
/// exists. Any failed step yields the same 401.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub PublicUser);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }
        let state = AppState::from_ref(state);

        let jar = CookieJar::from_headers(&parts.headers);
        let token = cookie::read(&jar).ok_or(AppError::Unauthorized)?;

        let claims = match state.jwt.verify(&token) {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "invalid or expired token");
                return Err(AppError::Unauthorized);
            }
        };

        let user = match state.store.find_by_id(claims.id).await {
            Ok(Some(u)) => u,
            Ok(None) => {
                warn!(user_id = %claims.id, "token for unknown user");
                return Err(AppError::Unauthorized);
            }
            Err(e) => {
                error!(error = %e, user_id = %claims.id, "user lookup failed");
                return Err(AppError::Unauthorized);
            }
        };

        let current = CurrentUser(PublicUser::from(user));
        parts.extensions.insert(current.clone());
        Ok(current)
    }
}
