use tokio::sync::{mpsc, oneshot, watch};

use crate::app::domain::label::LabelName;
use crate::app::domain::messages::{Command, CreateOutcome, SaveOutcome};
use crate::app::domain::session::StatusSnapshot;
use crate::app::infrastructure::error::{AppError, Result};

/// Cloneable front door to a running [`SyncController`](super::sync::SyncController).
///
/// Each call is queued behind whatever the controller is doing and resolves
/// once the controller has finished it. Dropping every handle stops the
/// controller.
#[derive(Clone)]
pub struct ControllerHandle {
    commands: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<StatusSnapshot>,
}

impl ControllerHandle {
    pub(crate) fn new(
        commands: mpsc::UnboundedSender<Command>,
        status: watch::Receiver<StatusSnapshot>,
    ) -> Self {
        Self { commands, status }
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .map_err(|_| AppError::ControllerClosed)?;
        response.await.map_err(|_| AppError::ControllerClosed)
    }

    /// Open a label, asking about unsaved edits first if there are any.
    pub async fn select_label(&self, name: impl Into<String>) -> Result<()> {
        let name = LabelName::new(name)?;
        self.request(|reply| Command::SelectLabel { name, reply })
            .await?
    }

    /// Create an empty text label and open it. Existing names are offered
    /// for opening instead and never re-created.
    pub async fn create_label(&self, name: impl Into<String>) -> Result<CreateOutcome> {
        let name = LabelName::new(name)?;
        self.request(|reply| Command::CreateLabel { name, reply })
            .await?
    }

    /// Write the buffer to the active label now. A no-op without an active
    /// text label.
    pub async fn save(&self) -> Result<SaveOutcome> {
        self.request(|reply| Command::Save { reply }).await?
    }

    pub async fn reload_directory(&self) -> Result<usize> {
        self.request(|reply| Command::ReloadDirectory { reply })
            .await?
    }

    /// Set the directory filter and return the matching labels, sorted.
    pub async fn filter_labels(&self, query: impl Into<String>) -> Result<Vec<LabelName>> {
        let query = query.into();
        self.request(|reply| Command::FilterLabels { query, reply })
            .await
    }

    pub fn status(&self) -> StatusSnapshot {
        self.status.borrow().clone()
    }

    /// Receiver that observes every status change.
    pub fn subscribe(&self) -> watch::Receiver<StatusSnapshot> {
        self.status.clone()
    }

    pub fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown);
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }
}
