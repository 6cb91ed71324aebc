use std::sync::Arc;

use axum::extract::FromRef;
use axum::response::Redirect;
use axum::routing::{get, post};
use axum::Router;
use axum_extra::extract::cookie::Key;
use tera::Tera;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::api::articles;
use crate::auth::login;
use crate::auth::models::UserAccount;
use crate::config::AppConfig;
use crate::db::repository::ArticleRepository;
use crate::error::AppError;
use crate::rendering::templates::load_templates;

/// Shared, per-process state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub article_repo: Arc<dyn ArticleRepository>,
    pub templates: Arc<Tera>,
    pub accounts: Arc<Vec<UserAccount>>,
    /// Signs the session and flash cookies.
    pub cookie_key: Key,
    pub login_url: String,
    pub refresh_hash_on_edit: bool,
}

impl AppState {
    /// State with the default login URL and hash-on-edit behaviour.
    pub fn new(
        article_repo: Arc<dyn ArticleRepository>,
        accounts: Vec<UserAccount>,
        cookie_key: Key,
    ) -> Result<Self, AppError> {
        Ok(Self {
            article_repo,
            templates: Arc::new(load_templates()?),
            accounts: Arc::new(accounts),
            cookie_key,
            login_url: "/login".to_string(),
            refresh_hash_on_edit: false,
        })
    }

    /// State configured from `config`.
    pub fn from_config(
        article_repo: Arc<dyn ArticleRepository>,
        config: &AppConfig,
    ) -> Result<Self, AppError> {
        let cookie_key = match &config.session_secret {
            Some(secret) => Key::try_from(secret.as_bytes()).map_err(|_| {
                AppError::Internal("session_secret must be at least 64 bytes long".into())
            })?,
            None => {
                tracing::warn!("No session_secret configured, sessions will not survive a restart");
                Key::generate()
            }
        };

        let mut state = Self::new(article_repo, config.accounts(), cookie_key)?;
        state.login_url = config.login_url.clone();
        state.refresh_hash_on_edit = config.refresh_hash_on_edit;
        Ok(state)
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to("/articles/") }))
        .route(
            "/login",
            get(login::login_page_handler).post(login::login_handler),
        )
        .route("/logout", post(login::logout_handler))
        .route("/articles/", get(articles::change_list_handler))
        .route(
            "/articles/add/",
            get(articles::add_page_handler).post(articles::add_handler),
        )
        .route(
            "/articles/{id}/change/",
            get(articles::change_page_handler).post(articles::change_handler),
        )
        .route(
            "/articles/{id}/delete/",
            get(articles::delete_page_handler).post(articles::delete_handler),
        )
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
