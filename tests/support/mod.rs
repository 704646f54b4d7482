#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use label_pad::app::controllers::{ControllerConfig, ControllerHandle, Presenter, SyncController};
use label_pad::app::domain::label::LabelName;
use label_pad::app::domain::messages::Notice;
use label_pad::app::infrastructure::buffer::MemoryBuffer;
use label_pad::app::services::store::MemoryStore;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    SaveBeforeSwitch(String),
    OpenExisting(String),
}

/// Presenter that answers from a script and records everything it is asked
/// and told.
#[derive(Default)]
pub struct ScriptedPresenter {
    save_answers: Mutex<VecDeque<bool>>,
    open_existing: AtomicBool,
    prompts: Mutex<Vec<Prompt>>,
    notices: Mutex<Vec<Notice>>,
}

impl ScriptedPresenter {
    /// Queue the next answer to "save before switching?". Unscripted
    /// questions are answered no.
    pub fn answer_save(&self, save: bool) {
        self.save_answers.lock().unwrap().push_back(save);
    }

    pub fn answer_open_existing(&self, open: bool) {
        self.open_existing.store(open, Ordering::SeqCst);
    }

    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn failures(&self) -> Vec<Notice> {
        self.notices()
            .into_iter()
            .filter(|n| n.is_failure())
            .collect()
    }
}

#[async_trait]
impl Presenter for ScriptedPresenter {
    async fn confirm_save_before_switch(&self, label: &LabelName) -> bool {
        self.prompts
            .lock()
            .unwrap()
            .push(Prompt::SaveBeforeSwitch(label.to_string()));
        self.save_answers.lock().unwrap().pop_front().unwrap_or(false)
    }

    async fn confirm_open_existing(&self, label: &LabelName) -> bool {
        self.prompts
            .lock()
            .unwrap()
            .push(Prompt::OpenExisting(label.to_string()));
        self.open_existing.load(Ordering::SeqCst)
    }

    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub buffer: MemoryBuffer,
    pub presenter: Arc<ScriptedPresenter>,
    pub handle: ControllerHandle,
    pub task: JoinHandle<()>,
}

impl Harness {
    /// Wait until the controller has processed everything queued so far.
    /// Events are handled before commands, so one round trip is enough.
    pub async fn sync(&self) {
        let query = self.handle.status().query;
        self.handle.filter_labels(query).await.unwrap();
    }

    /// A user edit followed by [`sync`](Self::sync).
    pub async fn type_text(&self, text: &str) {
        assert!(self.buffer.replace_all(text), "edit refused");
        self.sync().await;
    }
}

/// Start a controller over `store` with the default 1000ms autosave delay.
pub async fn start(store: MemoryStore) -> Harness {
    let store = Arc::new(store);
    let buffer = MemoryBuffer::new();
    let presenter = Arc::new(ScriptedPresenter::default());
    let (controller, handle) = SyncController::new(
        store.clone(),
        Box::new(buffer.clone()),
        presenter.clone(),
        ControllerConfig::default(),
    );
    let task = tokio::spawn(controller.run());
    let harness = Harness {
        store,
        buffer,
        presenter,
        handle,
        task,
    };
    harness.sync().await;
    harness
}

pub fn two_labels() -> MemoryStore {
    MemoryStore::with_labels([("a.txt", "x"), ("B.md", "# bee")])
}

pub async fn idle(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
