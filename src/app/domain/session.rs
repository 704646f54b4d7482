use std::fmt;

use super::label::{ContentInfo, LabelName};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Empty,
    Loading,
    Clean,
    Dirty,
    Saving,
    SaveFailed,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Empty => "empty",
            Mode::Loading => "loading",
            Mode::Clean => "clean",
            Mode::Dirty => "dirty",
            Mode::Saving => "saving",
            Mode::SaveFailed => "save failed",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single editing session. Owned exclusively by the sync controller.
#[derive(Debug, Default)]
pub struct Session {
    active_label: Option<LabelName>,
    content: Option<ContentInfo>,
    mode: Mode,
    dirty: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_label(&self) -> Option<&LabelName> {
        self.active_label.as_ref()
    }

    pub fn content(&self) -> Option<&ContentInfo> {
        self.content.as_ref()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The active label, only when it holds editable text.
    pub fn writable_label(&self) -> Option<&LabelName> {
        match (&self.active_label, &self.content) {
            (Some(label), Some(info)) if info.is_text => Some(label),
            _ => None,
        }
    }

    /// Whether a buffer change should count as an edit right now.
    pub fn accepts_edits(&self) -> bool {
        self.writable_label().is_some()
            && matches!(self.mode, Mode::Clean | Mode::Dirty | Mode::SaveFailed)
    }

    /// Reset for a new load. The previous label is forgotten.
    pub fn begin_loading(&mut self) {
        self.active_label = None;
        self.content = None;
        self.dirty = false;
        self.mode = Mode::Loading;
    }

    pub fn finish_loading(&mut self, label: LabelName, info: ContentInfo) {
        self.active_label = Some(label);
        self.content = Some(info);
        self.dirty = false;
        self.mode = Mode::Clean;
    }

    pub fn fail_loading(&mut self) {
        self.active_label = None;
        self.content = None;
        self.dirty = false;
        self.mode = Mode::Empty;
    }

    pub fn mark_edited(&mut self) {
        self.dirty = true;
        self.mode = Mode::Dirty;
    }

    pub fn begin_saving(&mut self) {
        self.mode = Mode::Saving;
    }

    pub fn finish_saving(&mut self, size_bytes: u64) {
        self.dirty = false;
        self.mode = Mode::Clean;
        if let Some(info) = self.content.as_mut() {
            info.size_bytes = size_bytes;
        }
    }

    /// A failed save always leaves the session dirty so the edits are
    /// offered for saving again before any switch.
    pub fn fail_saving(&mut self) {
        self.dirty = true;
        self.mode = Mode::SaveFailed;
    }
}

/// Read-only view of the controller published for status displays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub active_label: Option<LabelName>,
    pub mode: Mode,
    pub dirty: bool,
    pub content: Option<ContentInfo>,
    pub query: String,
    pub visible_labels: Vec<LabelName>,
}

impl StatusSnapshot {
    /// One-line status, e.g. `*notes.md [dirty, Markdown]`.
    pub fn status_line(&self) -> String {
        let Some(label) = &self.active_label else {
            return format!("(no label) [{}]", self.mode);
        };
        let prefix = if self.dirty { "*" } else { "" };
        match &self.content {
            Some(info) if !info.is_text => format!("{}{} [{}, binary]", prefix, label, self.mode),
            Some(ContentInfo {
                syntax_hint: Some(hint),
                ..
            }) => format!("{}{} [{}, {}]", prefix, label, self.mode, hint),
            _ => format!("{}{} [{}]", prefix, label, self.mode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_info() -> ContentInfo {
        ContentInfo {
            is_text: true,
            size_bytes: 1,
            syntax_hint: Some("Plain Text".to_string()),
        }
    }

    #[test]
    fn test_new_session_is_empty() {
        let session = Session::new();
        assert_eq!(session.mode(), Mode::Empty);
        assert!(session.active_label().is_none());
        assert!(!session.is_dirty());
        assert!(!session.accepts_edits());
    }

    #[test]
    fn test_loading_forgets_previous_label() {
        let mut session = Session::new();
        session.finish_loading(LabelName::new("a.txt").unwrap(), text_info());
        session.mark_edited();

        session.begin_loading();
        assert_eq!(session.mode(), Mode::Loading);
        assert!(session.active_label().is_none());
        assert!(!session.is_dirty());
        assert!(!session.accepts_edits());
    }

    #[test]
    fn test_binary_label_is_not_writable() {
        let mut session = Session::new();
        let info = ContentInfo {
            is_text: false,
            size_bytes: 10,
            syntax_hint: None,
        };
        session.finish_loading(LabelName::new("logo.png").unwrap(), info);
        assert_eq!(session.mode(), Mode::Clean);
        assert!(session.writable_label().is_none());
        assert!(!session.accepts_edits());
    }

    #[test]
    fn test_save_failure_keeps_dirty() {
        let mut session = Session::new();
        session.finish_loading(LabelName::new("a.txt").unwrap(), text_info());
        session.mark_edited();
        session.begin_saving();
        session.fail_saving();
        assert_eq!(session.mode(), Mode::SaveFailed);
        assert!(session.is_dirty());
        assert!(session.accepts_edits());

        session.begin_saving();
        session.finish_saving(2);
        assert_eq!(session.mode(), Mode::Clean);
        assert!(!session.is_dirty());
        assert_eq!(session.content().map(|c| c.size_bytes), Some(2));
    }

    #[test]
    fn test_status_line() {
        let mut snapshot = StatusSnapshot::default();
        assert_eq!(snapshot.status_line(), "(no label) [empty]");

        snapshot.active_label = Some(LabelName::new("a.txt").unwrap());
        snapshot.mode = Mode::Dirty;
        snapshot.dirty = true;
        snapshot.content = Some(text_info());
        assert_eq!(snapshot.status_line(), "*a.txt [dirty, Plain Text]");
    }
}
