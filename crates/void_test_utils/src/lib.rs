//! # Void Test Utilities
//!
//! Shared testing utilities for the workspace:
//! - Fixture templates and ready-made matches
//! - Determinism test harness
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;

/// Re-export proptest for convenience.
pub use proptest;
