//! Infrastructure layer - external integrations and utilities.
//!
//! This module contains code that interfaces with external systems:
//! - The editable buffer contract and an in-memory buffer
//! - Logging setup
//! - Error types

pub mod buffer;
pub mod error;
pub mod logging;
