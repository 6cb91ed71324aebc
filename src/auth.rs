//! Session-based authentication.
//!
//! `middleware` holds the gate every article handler passes through,
//! `login` the pages that establish and end a session.

pub mod login;
pub mod middleware;
pub mod models;
