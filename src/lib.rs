//! Article publishing backend: users, articles and comments over a JSON API
//! with JWT authentication.

pub mod app;
pub mod articles;
pub mod auth;
pub mod comments;
pub mod config;
pub mod db;
pub mod error;
pub mod state;
pub mod users;
