use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::Redirect;
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::SignedCookieJar;

use crate::app::AppState;
use crate::auth::models::AuthenticatedUser;
use crate::error::AppError;

/// Name of the signed cookie holding the logged-in user.
pub const SESSION_COOKIE: &str = "quill_session";

/// Store `user` in the session cookie.
pub fn start_session(
    jar: SignedCookieJar,
    user: &AuthenticatedUser,
) -> Result<SignedCookieJar, AppError> {
    let user_json = serde_json::to_string(user)
        .map_err(|e| AppError::Internal(format!("Failed to serialize user: {}", e)))?;

    let cookie = Cookie::build((SESSION_COOKIE, user_json))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    Ok(jar.add(cookie))
}

/// Clear the session cookie.
pub fn end_session(jar: SignedCookieJar) -> SignedCookieJar {
    let cookie = Cookie::build((SESSION_COOKIE, "")).path("/").removal().build();
    jar.remove(cookie)
}

/// The user stored in the session, if the cookie is present and its signature checks out.
pub fn session_user(jar: &SignedCookieJar) -> Option<AuthenticatedUser> {
    let cookie = jar.get(SESSION_COOKIE)?;
    match serde_json::from_str(cookie.value()) {
        Ok(user) => Some(user),
        Err(e) => {
            tracing::warn!("Ignoring malformed session cookie: {e}");
            None
        }
    }
}

/// Authentication gate.
///
/// Any handler taking an `AuthenticatedUser` argument only runs for logged-in
/// requesters; everyone else is redirected to the login page before later
/// extractors (such as the form body) are evaluated.
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = SignedCookieJar::from_headers(&parts.headers, state.cookie_key.clone());

        session_user(&jar).ok_or_else(|| {
            tracing::debug!("Unauthenticated request to {}, redirecting to login", parts.uri);
            Redirect::to(&state.login_url)
        })
    }
}
