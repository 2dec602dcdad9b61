//! BookShare Community Book Lending Marketplace
//!
//! A REST JSON API server for a peer-to-peer book lending marketplace:
//! members list books they own and borrow books from each other, with
//! a transactional availability state machine at the core.

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
