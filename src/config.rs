use std::path::Path;

use serde::Deserialize;

use crate::auth::models::{demo_accounts, UserAccount};

/// Which persistence backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Mongodb,
    Memory,
}

/// Runtime configuration.
///
/// Sources, later ones winning:
/// - built-in defaults
/// - an optional config file (`--config <path>`, any format the `config` crate understands)
/// - `QUILL_*` environment variables, nested keys separated by `__`
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Address the HTTP server binds to.
    pub bind_addr: String,
    pub storage: StorageBackend,
    pub mongodb_uri: String,
    pub mongodb_database: String,
    /// Secret used to sign session and flash cookies. Must be at least 64 bytes.
    /// A random key is generated at startup when unset.
    #[serde(default)]
    pub session_secret: Option<String>,
    /// Where unauthenticated requests are redirected.
    pub login_url: String,
    /// Recompute the content hash when an article is edited.
    pub refresh_hash_on_edit: bool,
    /// Default tracing filter, overridden by `RUST_LOG`.
    pub log_filter: String,
    /// Login accounts. The demo accounts are used when empty.
    #[serde(default)]
    pub users: Vec<UserAccount>,
}

impl AppConfig {
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("bind_addr", "127.0.0.1:3000")?
            .set_default("storage", "mongodb")?
            .set_default("mongodb_uri", "mongodb://localhost:27017")?
            .set_default("mongodb_database", "quill")?
            .set_default("login_url", "/login")?
            .set_default("refresh_hash_on_edit", false)?
            .set_default("log_filter", "quill=info,tower_http=info")?;

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder
            .add_source(
                config::Environment::with_prefix("QUILL")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Configured accounts, falling back to the demo accounts.
    pub fn accounts(&self) -> Vec<UserAccount> {
        if self.users.is_empty() {
            demo_accounts()
        } else {
            self.users.clone()
        }
    }
}
