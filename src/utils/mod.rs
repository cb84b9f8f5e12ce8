//! The `utils` module provides a collection of utility functions and common
//! definitions used across the broker.
//!
//! It centralizes the error taxonomy and the logging bootstrap so every other
//! module reports failures and diagnostics the same way.

pub mod error;
pub mod logging;

pub use error::{BrokerError, CloseError, Result};
