//! The label synchronization controller.
//!
//! Owns the editing [`Session`], the label directory and the autosave timer,
//! and is the only place where the store is written. It runs as a single
//! task: commands from [`ControllerHandle`]s and internal events (buffer
//! changes, timer expiry) are processed strictly one at a time, and each
//! store operation is awaited before the next message is looked at. That is
//! what keeps two fetches from racing to set the active label and keeps a
//! save from overlapping another save.
//!
//! Internal events are polled before commands so that a save request sent
//! right after an edit sees that edit already applied to the session.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, trace, warn};

use super::autosave::AutosaveTimer;
use super::handle::ControllerHandle;
use super::presenter::Presenter;
use crate::app::domain::label::{ContentInfo, LabelContent, LabelName};
use crate::app::domain::messages::{Action, Command, CreateOutcome, Event, Notice, SaveOutcome};
use crate::app::domain::session::{Mode, Session, StatusSnapshot};
use crate::app::domain::settings::Settings;
use crate::app::infrastructure::buffer::Buffer;
use crate::app::infrastructure::error::Result;
use crate::app::services::directory::LabelDirectory;
use crate::app::services::store::{StoreClient, StoreError};
use crate::app::services::syntax::SyntaxCatalog;

pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Quiet period after the last edit before an autosave is written.
    pub autosave_delay: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            autosave_delay: DEFAULT_AUTOSAVE_DELAY,
        }
    }
}

impl From<&Settings> for ControllerConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            autosave_delay: settings.autosave_delay(),
        }
    }
}

pub struct SyncController {
    store: Arc<dyn StoreClient>,
    buffer: Box<dyn Buffer>,
    presenter: Arc<dyn Presenter>,
    syntax: SyntaxCatalog,
    directory: LabelDirectory,
    session: Session,
    autosave: AutosaveTimer,
    query: String,
    /// Bumped whenever the controller replaces the buffer content. Change
    /// notifications carry the value current at mutation time.
    load_epoch: Arc<AtomicU64>,
    /// Set while the controller itself writes the buffer.
    suppress_changes: Arc<AtomicBool>,
    commands: mpsc::UnboundedReceiver<Command>,
    events: mpsc::UnboundedReceiver<Event>,
    status: watch::Sender<StatusSnapshot>,
}

impl SyncController {
    pub fn new(
        store: Arc<dyn StoreClient>,
        mut buffer: Box<dyn Buffer>,
        presenter: Arc<dyn Presenter>,
        config: ControllerConfig,
    ) -> (Self, ControllerHandle) {
        let (command_tx, commands) = mpsc::unbounded_channel();
        let (event_tx, events) = mpsc::unbounded_channel();
        let (status, status_rx) = watch::channel(StatusSnapshot::default());

        let load_epoch = Arc::new(AtomicU64::new(0));
        let suppress_changes = Arc::new(AtomicBool::new(false));

        let listener_epoch = load_epoch.clone();
        let listener_suppress = suppress_changes.clone();
        let listener_tx = event_tx.clone();
        buffer.on_change(Box::new(move || {
            if listener_suppress.load(Ordering::Acquire) {
                return;
            }
            let epoch = listener_epoch.load(Ordering::Acquire);
            let _ = listener_tx.send(Event::BufferChanged { epoch });
        }));
        buffer.set_editable(false);

        let controller = Self {
            store,
            buffer,
            presenter,
            syntax: SyntaxCatalog::load_defaults(),
            directory: LabelDirectory::new(),
            session: Session::new(),
            autosave: AutosaveTimer::new(config.autosave_delay, event_tx),
            query: String::new(),
            load_epoch,
            suppress_changes,
            commands,
            events,
            status,
        };
        (controller, ControllerHandle::new(command_tx, status_rx))
    }

    /// Populate the directory, then process messages until shutdown or until
    /// every handle is dropped.
    pub async fn run(mut self) {
        info!("sync controller started");
        if let Err(e) = self.reload_directory().await {
            debug!("initial directory load failed: {}", e);
        }
        self.publish();

        loop {
            tokio::select! {
                biased;
                Some(event) = self.events.recv() => self.handle_event(event).await,
                command = self.commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle_command(command).await,
                },
            }
        }

        self.autosave.cancel();
        info!("sync controller stopped");
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::SelectLabel { name, reply } => {
                let result = self.select_label(name).await;
                let _ = reply.send(result);
            }
            Command::CreateLabel { name, reply } => {
                let result = self.create_label(name).await;
                let _ = reply.send(result);
            }
            Command::Save { reply } => {
                let result = self.save(Action::Save).await;
                let _ = reply.send(result);
            }
            Command::ReloadDirectory { reply } => {
                let result = self.reload_directory().await;
                let _ = reply.send(result);
            }
            Command::FilterLabels { query, reply } => {
                let _ = reply.send(self.filter_labels(query));
            }
            Command::Shutdown => {}
        }
    }

    async fn handle_event(&mut self, event: Event) {
        match event {
            Event::BufferChanged { epoch } => self.buffer_changed(epoch),
            Event::AutosaveDue { generation } => {
                if !self.autosave.take_expiry(generation) {
                    trace!(generation, "stale autosave dropped");
                    return;
                }
                if self.session.mode() == Mode::Dirty {
                    // Failures are reported inside; the edits stay for a retry.
                    let _ = self.save(Action::Autosave).await;
                }
            }
        }
    }

    fn buffer_changed(&mut self, epoch: u64) {
        if epoch != self.load_epoch.load(Ordering::Acquire) {
            debug!(epoch, "change notification from a previous load dropped");
            return;
        }
        if !self.session.accepts_edits() {
            trace!(mode = %self.session.mode(), "buffer change ignored");
            return;
        }
        let was_dirty = self.session.mode() == Mode::Dirty;
        self.session.mark_edited();
        self.autosave.arm();
        // Further keystrokes leave the snapshot unchanged.
        if !was_dirty {
            self.publish();
        }
    }

    /// Apply buffer changes that are already queued. Timer expiries found
    /// here are consumed; the caller settles any pending save itself.
    fn apply_pending_edits(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                Event::BufferChanged { epoch } => self.buffer_changed(epoch),
                Event::AutosaveDue { generation } => {
                    self.autosave.take_expiry(generation);
                }
            }
        }
    }

    async fn select_label(&mut self, name: LabelName) -> Result<()> {
        // Nothing typed from here on may be overwritten by the load.
        self.buffer.set_editable(false);
        self.apply_pending_edits();

        if self.session.is_dirty() {
            if let Some(current) = self.session.writable_label().cloned() {
                if self.presenter.confirm_save_before_switch(&current).await {
                    // A failed save abandons the switch so the edits survive.
                    if let Err(e) = self.save(Action::Save).await {
                        self.buffer.set_editable(true);
                        return Err(e);
                    }
                } else {
                    info!(label = %current, "discarding unsaved edits");
                }
            }
        }

        self.autosave.cancel();
        self.session.begin_loading();
        self.publish();

        info!(label = %name, "opening label");
        match self.store.fetch_label(&name).await {
            Ok(content) => {
                self.finish_loading(name, content);
                Ok(())
            }
            Err(e) => {
                warn!(label = %name, "failed to open label: {}", e);
                self.session.fail_loading();
                self.load_into_buffer("");
                self.report(Action::Open, Some(name), &e);
                self.publish();
                Err(e.into())
            }
        }
    }

    fn finish_loading(&mut self, name: LabelName, content: LabelContent) {
        match content {
            LabelContent::Text { text, size_bytes } => {
                let hint = self.syntax.hint_for(name.as_str()).to_string();
                self.load_into_buffer(&text);
                self.buffer.set_syntax_hint(&hint);
                self.buffer.set_editable(true);
                let info = ContentInfo {
                    is_text: true,
                    size_bytes,
                    syntax_hint: Some(hint),
                };
                self.session.finish_loading(name.clone(), info);
                debug!(label = %name, size_bytes, "text label loaded");
                self.presenter.notify(Notice::Opened {
                    label: name,
                    size_bytes,
                });
            }
            LabelContent::Binary { size_bytes } => {
                self.load_into_buffer("");
                let info = ContentInfo {
                    is_text: false,
                    size_bytes,
                    syntax_hint: None,
                };
                self.session.finish_loading(name.clone(), info);
                debug!(label = %name, size_bytes, "binary label opened read-only");
                self.presenter.notify(Notice::OpenedBinary {
                    label: name,
                    size_bytes,
                });
            }
        }
        self.publish();
    }

    /// Replace the buffer content without it counting as an edit.
    fn load_into_buffer(&mut self, text: &str) {
        self.load_epoch.fetch_add(1, Ordering::AcqRel);
        self.suppress_changes.store(true, Ordering::Release);
        self.buffer.set_content(text);
        self.buffer.clear_edit_history();
        self.suppress_changes.store(false, Ordering::Release);
    }

    /// The save sequence shared by explicit saves and autosave.
    async fn save(&mut self, action: Action) -> Result<SaveOutcome> {
        let Some(label) = self.session.writable_label().cloned() else {
            if let Some(active) = self.session.active_label() {
                debug!(label = %active, "read-only label, nothing to save");
            }
            return Ok(SaveOutcome::NothingToSave);
        };
        if !matches!(
            self.session.mode(),
            Mode::Clean | Mode::Dirty | Mode::SaveFailed
        ) {
            return Ok(SaveOutcome::NothingToSave);
        }

        self.autosave.cancel();
        self.session.begin_saving();
        self.publish();

        let text = self.buffer.content();
        info!(label = %label, bytes = text.len(), ?action, "writing label");
        match self.store.write_label(&label, &text).await {
            Ok(()) => {
                self.session.finish_saving(text.len() as u64);
                self.presenter.notify(Notice::Saved { label });
                self.publish();
                Ok(SaveOutcome::Saved)
            }
            Err(e) => {
                warn!(label = %label, "save failed: {}", e);
                self.session.fail_saving();
                self.report(action, Some(label), &e);
                self.publish();
                Err(e.into())
            }
        }
    }

    async fn create_label(&mut self, name: LabelName) -> Result<CreateOutcome> {
        if self.directory.contains(&name) {
            return self.offer_existing(name).await;
        }

        info!(label = %name, "creating label");
        match self.store.create_label(&name, "").await {
            Ok(()) => {}
            Err(StoreError::AlreadyExists(_)) => {
                // Created elsewhere since the last listing.
                self.directory.insert(name.clone());
                self.publish();
                return self.offer_existing(name).await;
            }
            Err(e) => {
                warn!(label = %name, "failed to create label: {}", e);
                self.report(Action::Create, Some(name), &e);
                return Err(e.into());
            }
        }
        self.presenter.notify(Notice::Created {
            label: name.clone(),
        });

        if let Err(e) = self.reload_directory().await {
            debug!("directory reload after create failed: {}", e);
        }
        self.directory.insert(name.clone());
        self.publish();

        self.select_label(name).await?;
        Ok(CreateOutcome::Created)
    }

    async fn offer_existing(&mut self, name: LabelName) -> Result<CreateOutcome> {
        if !self.presenter.confirm_open_existing(&name).await {
            return Ok(CreateOutcome::Declined);
        }
        self.select_label(name).await?;
        Ok(CreateOutcome::OpenedExisting)
    }

    async fn reload_directory(&mut self) -> Result<usize> {
        match self.directory.reload(self.store.as_ref()).await {
            Ok(count) => {
                self.presenter.notify(Notice::DirectoryLoaded { count });
                self.publish();
                Ok(count)
            }
            Err(e) => {
                warn!("failed to list labels: {}", e);
                self.report(Action::ListLabels, None, &e);
                Err(e.into())
            }
        }
    }

    fn filter_labels(&mut self, query: String) -> Vec<LabelName> {
        if self.query != query {
            self.query = query;
            self.publish();
        }
        self.directory.filtered(&self.query)
    }

    fn report(&self, action: Action, label: Option<LabelName>, error: &StoreError) {
        self.presenter.notify(Notice::Failed {
            action,
            label,
            error: error.clone(),
        });
    }

    fn publish(&self) {
        let snapshot = StatusSnapshot {
            active_label: self.session.active_label().cloned(),
            mode: self.session.mode(),
            dirty: self.session.is_dirty(),
            content: self.session.content().cloned(),
            query: self.query.clone(),
            visible_labels: self.directory.filtered(&self.query),
        };
        self.status.send_replace(snapshot);
    }
}
