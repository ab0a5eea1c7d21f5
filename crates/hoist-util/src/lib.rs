//! Shared utilities for the hoist deploy tool.
//!
//! This crate provides cross-cutting concerns used by all other hoist crates:
//! error types, filesystem helpers, digest computation, and terminal progress
//! indicators.

pub mod errors;
pub mod fs;
pub mod hash;
pub mod progress;
