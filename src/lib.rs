//! Building Portal Server
//!
//! REST JSON API for a multi-tenant office building: meeting-room bookings
//! with an approval workflow, tenant service requests, a building registry
//! and per-user notifications, all gated by role permissions.

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
