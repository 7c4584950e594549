// ABOUTME: HTTP surface for the crisis-detection ensemble service
pub mod config;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;

pub use config::ApiServerConfig;
pub use server::{AppState, ApiServer};
