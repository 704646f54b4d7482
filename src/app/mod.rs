//! Application layer - organized by Clean Architecture principles.
//!
//! # Structure
//!
//! - `domain/` - Core data structures (labels, session, messages, settings)
//! - `controllers/` - Orchestration (sync controller, autosave, presenter)
//! - `services/` - Business operations (directory, store clients, syntax, text_ops)
//! - `infrastructure/` - External integrations (buffer, logging, error)

pub mod controllers;
pub mod domain;
pub mod infrastructure;
pub mod services;
