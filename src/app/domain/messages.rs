use std::fmt;

use tokio::sync::oneshot;

use super::label::LabelName;
use crate::app::infrastructure::error::Result;
use crate::app::services::store::StoreError;

/// Requests sent from a `ControllerHandle` to the sync controller task.
/// Each one carries the channel its outcome is answered on.
#[derive(Debug)]
pub enum Command {
    SelectLabel {
        name: LabelName,
        reply: oneshot::Sender<Result<()>>,
    },
    CreateLabel {
        name: LabelName,
        reply: oneshot::Sender<Result<CreateOutcome>>,
    },
    Save {
        reply: oneshot::Sender<Result<SaveOutcome>>,
    },
    ReloadDirectory {
        reply: oneshot::Sender<Result<usize>>,
    },
    FilterLabels {
        query: String,
        reply: oneshot::Sender<Vec<LabelName>>,
    },
    Shutdown,
}

/// Events raised inside the controller's own process: buffer change
/// notifications and autosave timer expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The buffer was mutated while holding the content of load `epoch`.
    BufferChanged { epoch: u64 },
    /// The autosave timer armed as `generation` ran out.
    AutosaveDue { generation: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    OpenedExisting,
    Declined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    NothingToSave,
}

/// The user-level operation a notice refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ListLabels,
    Open,
    Create,
    Save,
    Autosave,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::ListLabels => "listing labels",
            Action::Open => "opening",
            Action::Create => "creating",
            Action::Save => "saving",
            Action::Autosave => "autosaving",
        };
        f.write_str(s)
    }
}

/// Things the user is told about. Every failure yields one `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    DirectoryLoaded {
        count: usize,
    },
    Opened {
        label: LabelName,
        size_bytes: u64,
    },
    OpenedBinary {
        label: LabelName,
        size_bytes: u64,
    },
    Created {
        label: LabelName,
    },
    Saved {
        label: LabelName,
    },
    Failed {
        action: Action,
        label: Option<LabelName>,
        error: StoreError,
    },
}

impl Notice {
    pub fn is_failure(&self) -> bool {
        matches!(self, Notice::Failed { .. })
    }
}
