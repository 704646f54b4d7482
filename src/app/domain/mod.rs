//! Domain layer - core data structures and types.
//!
//! This module contains the fundamental domain models:
//! - Label names and content
//! - The editing session and its status snapshot
//! - Message types for the controller
//! - Application settings

pub mod label;
pub mod messages;
pub mod session;
pub mod settings;

pub use label::{ContentInfo, LabelContent, LabelName};
pub use messages::{Action, CreateOutcome, Notice, SaveOutcome};
pub use session::{Mode, Session, StatusSnapshot};
pub use settings::Settings;
