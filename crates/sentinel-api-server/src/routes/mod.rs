// ABOUTME: HTTP route handlers for the crisis-detection API server
pub mod analyze;
pub mod batch;
pub mod config;
pub mod health;
