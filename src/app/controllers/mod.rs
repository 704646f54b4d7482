//! Controllers layer - orchestration and coordination.
//!
//! This module contains the controller that coordinates the buffer,
//! the label directory and the remote store:
//! - The sync controller task and its handle
//! - The autosave debounce timer
//! - The presenter contract for decisions and notices

pub mod autosave;
pub mod handle;
pub mod presenter;
pub mod sync;

pub use handle::ControllerHandle;
pub use presenter::Presenter;
pub use sync::{ControllerConfig, SyncController};
