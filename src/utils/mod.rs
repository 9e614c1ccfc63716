//! The `utils` module provides a collection of utility functions and common
//! definitions used across the console.
//!
//! It holds the crate-wide error type and the tracing setup shared by the
//! binary and the tests.

pub mod error;
pub mod logging;

pub use error::{ConsoleError, ErrorKind, Result};
