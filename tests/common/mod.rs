use std::sync::Arc;

use axum::http::StatusCode;
use axum::Router;
use axum_extra::extract::cookie::Key;
use testcontainers::runners::AsyncRunner;
use testcontainers::ContainerAsync;
use testcontainers_modules::mongo::Mongo;

use quill::app::AppState;
use quill::auth::models::demo_accounts;
use quill::db::models::Article;
use quill::db::repository::{ArticleRepository, MemoryArticleRepository, MongoArticleRepository};

/// Provides the Axum router wired to an in-memory repository.
///
/// Each call to [`TestEnv::server`] returns a client with its own cookie
/// store, so two servers built from one env act as two browsers.
pub struct TestEnv {
    pub router: Router,
    pub repo: Arc<dyn ArticleRepository>,
}

impl TestEnv {
    pub fn start() -> Self {
        Self::with_repo(Arc::new(MemoryArticleRepository::new()), false)
    }

    /// Same as [`TestEnv::start`] but edits recompute the content hash.
    pub fn start_with_hash_refresh() -> Self {
        Self::with_repo(Arc::new(MemoryArticleRepository::new()), true)
    }

    pub fn with_repo(repo: Arc<dyn ArticleRepository>, refresh_hash_on_edit: bool) -> Self {
        let mut state = AppState::new(repo.clone(), demo_accounts(), Key::generate())
            .expect("Failed to build AppState");
        state.refresh_hash_on_edit = refresh_hash_on_edit;

        Self {
            router: quill::app::router(state),
            repo,
        }
    }

    /// A client that keeps cookies and does not assert on status codes.
    pub fn server(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .save_cookies()
            .build(self.router.clone())
    }

    /// A client already logged in as `username` (password == username).
    pub async fn logged_in(&self, username: &str) -> axum_test::TestServer {
        let server = self.server();
        let response = server
            .post("/login")
            .form(&[("username", username), ("password", username)])
            .await;
        assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/articles/");
        server
    }

    /// Helper: submit the creation form.
    pub async fn create(
        &self,
        server: &axum_test::TestServer,
        name: &str,
        content: &str,
    ) -> axum_test::TestResponse {
        server
            .post("/articles/add/")
            .form(&[("name", name), ("content", content)])
            .await
    }

    /// All articles stored for `username`'s account.
    pub async fn articles_of(&self, username: &str) -> Vec<Article> {
        self.repo
            .list_by_owner(&format!("user-{username}"))
            .await
            .expect("Failed to list articles")
    }
}

/// Assert a 303 redirect to `location`.
pub fn assert_redirect(response: &axum_test::TestResponse, location: &str) {
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], location);
}

/// A running MongoDB container and a repository connected to it.
///
/// The container is stopped when this struct is dropped.
pub struct MongoEnv {
    _mongo: ContainerAsync<Mongo>,
    pub repo: Arc<MongoArticleRepository>,
}

impl MongoEnv {
    pub async fn start() -> Self {
        let mongo_container = Mongo::default()
            .start()
            .await
            .expect("Failed to start MongoDB container");

        let mongo_port = mongo_container
            .get_host_port_ipv4(27017)
            .await
            .expect("Failed to get MongoDB port");
        let mongo_uri = format!("mongodb://127.0.0.1:{}", mongo_port);
        let mongo_client = mongodb::Client::with_uri_str(&mongo_uri)
            .await
            .expect("Failed to connect to MongoDB");
        let mongo_db = mongo_client.database("quill_test");

        let repo = Arc::new(MongoArticleRepository::new(&mongo_db));
        repo.ensure_indexes()
            .await
            .expect("Failed to create indexes");

        Self {
            _mongo: mongo_container,
            repo,
        }
    }
}
