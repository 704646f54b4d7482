use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Listener invoked on every buffer mutation.
pub type ChangeListener = Box<dyn FnMut() + Send>;

/// The editable text the controller loads labels into.
///
/// The controller only reads and writes through this contract. Every mutation,
/// including `set_content`, notifies the registered listener.
pub trait Buffer: Send {
    fn set_content(&mut self, text: &str);

    fn content(&self) -> String;

    fn clear_edit_history(&mut self);

    /// Register the single listener. A new registration replaces the old one.
    fn on_change(&mut self, listener: ChangeListener);

    fn set_syntax_hint(&mut self, hint: &str);

    /// Disabled buffers refuse user edits (binary labels, loads in flight).
    fn set_editable(&mut self, editable: bool);
}

#[derive(Default)]
struct BufferState {
    text: String,
    history: Vec<String>,
    syntax_hint: Option<String>,
    editable: bool,
    listener: Option<ChangeListener>,
}

impl BufferState {
    fn notify(&mut self) {
        if let Some(listener) = self.listener.as_mut() {
            listener();
        }
    }

    /// Apply a user edit, recording the previous text for undo.
    fn edit(&mut self, apply: impl FnOnce(&mut String)) -> bool {
        if !self.editable {
            return false;
        }
        let before = self.text.clone();
        apply(&mut self.text);
        if self.text == before {
            return false;
        }
        self.history.push(before);
        self.notify();
        true
    }
}

/// In-memory buffer. Clones share the same text, so one clone can be handed
/// to the controller while another plays the user typing into it.
#[derive(Clone, Default)]
pub struct MemoryBuffer {
    state: Arc<Mutex<BufferState>>,
}

impl MemoryBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BufferState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the whole text as a user edit. Returns false if refused or
    /// if nothing changed.
    pub fn replace_all(&self, text: &str) -> bool {
        self.lock().edit(|t| {
            t.clear();
            t.push_str(text);
        })
    }

    /// Insert text at a char index (clamped to the end) as a user edit.
    pub fn insert(&self, char_pos: usize, text: &str) -> bool {
        self.lock().edit(|t| {
            let byte_pos = t
                .char_indices()
                .nth(char_pos)
                .map(|(i, _)| i)
                .unwrap_or(t.len());
            t.insert_str(byte_pos, text);
        })
    }

    pub fn append(&self, text: &str) -> bool {
        self.lock().edit(|t| t.push_str(text))
    }

    /// Revert the last user edit. Undo is itself a mutation.
    pub fn undo(&self) -> bool {
        let mut state = self.lock();
        if !state.editable {
            return false;
        }
        match state.history.pop() {
            Some(previous) => {
                state.text = previous;
                state.notify();
                true
            }
            None => false,
        }
    }

    pub fn text(&self) -> String {
        self.lock().text.clone()
    }

    pub fn can_undo(&self) -> bool {
        !self.lock().history.is_empty()
    }

    pub fn is_editable(&self) -> bool {
        self.lock().editable
    }

    pub fn syntax_hint(&self) -> Option<String> {
        self.lock().syntax_hint.clone()
    }
}

impl Buffer for MemoryBuffer {
    fn set_content(&mut self, text: &str) {
        let mut state = self.lock();
        state.text.clear();
        state.text.push_str(text);
        state.notify();
    }

    fn content(&self) -> String {
        self.text()
    }

    fn clear_edit_history(&mut self) {
        self.lock().history.clear();
    }

    fn on_change(&mut self, listener: ChangeListener) {
        self.lock().listener = Some(listener);
    }

    fn set_syntax_hint(&mut self, hint: &str) {
        self.lock().syntax_hint = Some(hint.to_string());
    }

    fn set_editable(&mut self, editable: bool) {
        self.lock().editable = editable;
    }
}
