use async_trait::async_trait;

use crate::app::domain::label::LabelName;
use crate::app::domain::messages::Notice;

/// Decisions and notifications the controller needs from whoever presents
/// it to the user.
///
/// The controller awaits each decision before making its next transition.
#[async_trait]
pub trait Presenter: Send + Sync {
    /// The active label has unsaved edits and another label was selected.
    /// `true` saves before switching, `false` discards the edits.
    async fn confirm_save_before_switch(&self, label: &LabelName) -> bool;

    /// Creation was requested for a name that already exists.
    /// `true` opens the existing label instead.
    async fn confirm_open_existing(&self, label: &LabelName) -> bool;

    fn notify(&self, notice: Notice);
}
