// ABOUTME: HTTP-specific request/response/error models
pub mod errors;
pub mod requests;
pub mod responses;
