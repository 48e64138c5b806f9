//! PRONTIO action server.
//!
//! One `POST /` endpoint takes `{ action, payload }` and answers with the
//! `{ success, data, errors }` envelope. Records live in a SQLite table of
//! JSON documents.

pub mod config;
pub mod db;
pub mod handlers;
pub mod http;
pub mod router;

use std::sync::Arc;

use sqlx::sqlite::SqlitePool;
use tokio::net::TcpListener;

pub use config::ServerConfig;
pub use db::{RecordKind, RecordRepository};
pub use http::app;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<RecordRepository>,
}

impl AppState {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            repo: Arc::new(RecordRepository::new(pool)),
        }
    }
}

/// Serves the API on an already bound listener until the task is dropped.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    axum::serve(listener, app(state)).await
}
