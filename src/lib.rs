pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod services;
pub mod web;

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<Config>,
}
