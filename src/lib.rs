//! Notes REST API.
//!
//! CRUD over a single note resource backed by Postgres or an in-memory store,
//! with request logging, CORS, static images under `/images`, a shared error
//! pipeline and error telemetry.

pub mod app;
pub mod config;
pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod service;
pub mod state;
pub mod telemetry;

pub use app::build_router;
pub use config::{Config, ConfigError};
pub use error::ApiError;
pub use state::AppState;
