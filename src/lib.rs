pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod flash;
pub mod forms;
pub mod db {
    pub mod models;
    pub mod repository;
}
pub mod api {
    pub mod articles;
}
pub mod rendering {
    pub mod templates;
}
