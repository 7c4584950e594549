// ABOUTME: Shared domain types and errors for the crisis-detection ensemble
//! Data model for the crisis-detection ensemble service: the `Signal`s four
//! opaque classifiers produce, the `Weights` the Fallback Controller
//! renormalizes, the `Assessment` the Scoring Kernel returns, and the
//! bounded-history types the Context Analyzer consumes.

pub mod assessment;
pub mod breaker;
pub mod cache;
pub mod conflict;
pub mod error;
pub mod history;
pub mod severity;
pub mod signal;
pub mod weights;

pub use assessment::*;
pub use breaker::*;
pub use cache::*;
pub use conflict::*;
pub use error::*;
pub use history::*;
pub use severity::*;
pub use signal::*;
pub use weights::*;
