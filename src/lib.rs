//! Biblion Library Catalog Server
//!
//! A Rust REST JSON API for a small library catalog: account
//! registration/login with JWT bearer tokens and role-gated CRUD over
//! book records.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
