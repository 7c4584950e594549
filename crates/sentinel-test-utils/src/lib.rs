// ABOUTME: Shared testing fixtures and helpers for the crisis-detection ensemble
//! This crate contains shared testing fixtures, builders, and a scripted
//! Model Wrapper double used across the ensemble's test suite.

pub mod fixtures;
pub mod helpers;
pub mod wrapper_double;

pub use fixtures::*;
pub use helpers::*;
pub use wrapper_double::*;
