// ABOUTME: Ambient HTTP middleware for the API server (CORS, logging)

pub mod cors;
pub mod logging;
