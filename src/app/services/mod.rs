//! Services layer - business operations and utilities.
//!
//! This module contains business logic and operations:
//! - Label directory listing and filtering
//! - Remote store clients
//! - Syntax hint lookup
//! - Text operations

pub mod directory;
pub mod store;
pub mod syntax;
pub mod text_ops;
