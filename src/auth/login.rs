use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use axum_extra::extract::SignedCookieJar;
use serde::Deserialize;

use crate::app::AppState;
use crate::auth::middleware::{end_session, session_user, start_session};
use crate::auth::models::{AuthenticatedUser, UserAccount};
use crate::error::AppError;
use crate::flash::{self, Level};
use crate::rendering::templates::{page_context, render};

/// Where a successful login lands.
const HOME_URL: &str = "/articles/";

/// Login form body.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Validate credentials against the account directory and return the corresponding user.
pub fn authenticate(
    accounts: &[UserAccount],
    username: &str,
    password: &str,
) -> Result<AuthenticatedUser, AppError> {
    accounts
        .iter()
        .find(|a| a.username == username && a.password == password)
        .map(UserAccount::to_user)
        .ok_or_else(|| AppError::Auth("Invalid username or password".into()))
}

fn login_page(
    state: &AppState,
    jar: SignedCookieJar,
    username: &str,
    error: Option<&str>,
) -> Result<(SignedCookieJar, Html<String>), AppError> {
    let (jar, messages) = flash::take(jar);
    let user = session_user(&jar);

    let mut context = page_context(user.as_ref(), &messages, &[]);
    context.insert("username", username);
    context.insert("error", &error);

    Ok((jar, render(&state.templates, "auth/login.html", &context)?))
}

/// `GET /login`
pub async fn login_page_handler(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Result<(SignedCookieJar, Html<String>), AppError> {
    login_page(&state, jar, "", None)
}

/// `POST /login`
///
/// On success stores the user in the session cookie and redirects to the
/// article list; otherwise re-renders the form with a 401.
pub async fn login_handler(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    match authenticate(&state.accounts, &form.username, &form.password) {
        Ok(user) => {
            tracing::info!(user_id = %user.user_id, "User logged in");
            let jar = start_session(jar, &user)?;
            Ok((jar, Redirect::to(HOME_URL)).into_response())
        }
        Err(AppError::Auth(msg)) => {
            tracing::info!(username = %form.username, "Rejected login attempt");
            let page = login_page(&state, jar, &form.username, Some(msg.as_str()))?;
            Ok((StatusCode::UNAUTHORIZED, page).into_response())
        }
        Err(e) => Err(e),
    }
}

/// `POST /logout` — clears the session and returns to the login page.
pub async fn logout_handler(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Result<(SignedCookieJar, Redirect), AppError> {
    let jar = end_session(jar);
    let jar = flash::push(jar, Level::Info, "You have been logged out.")?;
    Ok((jar, Redirect::to(&state.login_url)))
}
