//! AdBoard Server
//!
//! A Rust implementation of the AdBoard out-of-home advertising back office,
//! providing a REST JSON API for managing advertising assets, availability
//! forecasts and QR code generation.

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
