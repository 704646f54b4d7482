//! Line-oriented console front end.
//!
//! Commands and yes/no answers share one stdin stream. The prompt loop only
//! holds the stdin lock while reading a command, so the presenter can read
//! an answer while the controller is waiting on it.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

use crate::app::controllers::{ControllerHandle, Presenter};
use crate::app::domain::label::LabelName;
use crate::app::domain::messages::{CreateOutcome, Notice, SaveOutcome};
use crate::app::infrastructure::buffer::MemoryBuffer;
use crate::app::infrastructure::error::Result;
use crate::app::services::text_ops::format_size;

pub type SharedInput = Arc<Mutex<Lines<BufReader<Stdin>>>>;

pub fn stdin_lines() -> SharedInput {
    Arc::new(Mutex::new(BufReader::new(tokio::io::stdin()).lines()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    List(String),
    Open(String),
    New(String),
    Set(String),
    Append(String),
    Undo,
    Show,
    Save,
    Status,
    Reload,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  ls [query]      list labels, optionally filtered (case-insensitive)
  open <label>    open a label
  new <label>     create an empty label and open it
  set <text>      replace the buffer text
  append <text>   append a line to the buffer
  undo            undo the last edit
  show            print the buffer
  save            save now (edits also autosave after a pause)
  status          show the active label and its state
  reload          reload the label list from the store
  help            show this help
  quit            exit";

/// Parse one input line. Returns None for blank lines.
pub fn parse_command(line: &str) -> std::result::Result<Option<ConsoleCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let required = |what: &str| -> std::result::Result<String, String> {
        if rest.is_empty() {
            Err(format!("{} requires {}", word, what))
        } else {
            Ok(rest.to_string())
        }
    };

    let command = match word {
        "ls" | "list" => ConsoleCommand::List(rest.to_string()),
        "open" | "o" => ConsoleCommand::Open(required("a label name")?),
        "new" => ConsoleCommand::New(required("a label name")?),
        "set" => ConsoleCommand::Set(rest.to_string()),
        "append" | "a" => ConsoleCommand::Append(required("some text")?),
        "undo" => ConsoleCommand::Undo,
        "show" | "cat" => ConsoleCommand::Show,
        "save" | "w" => ConsoleCommand::Save,
        "status" => ConsoleCommand::Status,
        "reload" => ConsoleCommand::Reload,
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" | "q" => ConsoleCommand::Quit,
        other => return Err(format!("Unknown command: {} (try 'help')", other)),
    };
    Ok(Some(command))
}

/// Interpret a yes/no answer. Anything but an explicit yes is a no.
pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

pub fn describe_notice(notice: &Notice) -> String {
    match notice {
        Notice::DirectoryLoaded { count } => format!("{} label(s) in store", count),
        Notice::Opened { label, size_bytes } => {
            format!("Opened {} ({})", label, format_size(*size_bytes))
        }
        Notice::OpenedBinary { label, size_bytes } => format!(
            "{} is binary ({}); it can't be edited here",
            label,
            format_size(*size_bytes)
        ),
        Notice::Created { label } => format!("Created {}", label),
        Notice::Saved { label } => format!("Saved {}", label),
        Notice::Failed {
            action,
            label: Some(label),
            error,
        } => format!("Error {} {}: {}", action, label, error),
        Notice::Failed {
            action,
            label: None,
            error,
        } => format!("Error {}: {}", action, error),
    }
}

pub struct ConsolePresenter {
    input: SharedInput,
}

impl ConsolePresenter {
    pub fn new(input: SharedInput) -> Self {
        Self { input }
    }

    async fn ask(&self, question: &str) -> bool {
        println!("{} [y/N]", question);
        let mut input = self.input.lock().await;
        match input.next_line().await {
            Ok(Some(answer)) => is_yes(&answer),
            _ => false,
        }
    }
}

#[async_trait]
impl Presenter for ConsolePresenter {
    async fn confirm_save_before_switch(&self, label: &LabelName) -> bool {
        self.ask(&format!("\"{}\" has unsaved changes. Save before switching?", label))
            .await
    }

    async fn confirm_open_existing(&self, label: &LabelName) -> bool {
        self.ask(&format!("\"{}\" already exists. Open it?", label))
            .await
    }

    fn notify(&self, notice: Notice) {
        if notice.is_failure() {
            eprintln!("{}", describe_notice(&notice));
        } else {
            println!("{}", describe_notice(&notice));
        }
    }
}

/// Read commands until `quit` or end of input.
pub async fn run_console(handle: ControllerHandle, buffer: MemoryBuffer, input: SharedInput) -> Result<()> {
    println!("{}", HELP);
    loop {
        let line = {
            let mut input = input.lock().await;
            input.next_line().await?
        };
        let Some(line) = line else {
            break;
        };

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                eprintln!("{}", message);
                continue;
            }
        };

        if command == ConsoleCommand::Quit {
            break;
        }
        // Failures have already been reported through the presenter.
        if let Err(e) = execute(&handle, &buffer, command).await {
            tracing::debug!("command failed: {}", e);
        }
    }
    handle.shutdown();
    Ok(())
}

async fn execute(handle: &ControllerHandle, buffer: &MemoryBuffer, command: ConsoleCommand) -> Result<()> {
    match command {
        ConsoleCommand::List(query) => {
            let labels = handle.filter_labels(query).await?;
            if labels.is_empty() {
                println!("(no labels)");
            }
            for label in labels {
                println!("  {}", label);
            }
        }
        ConsoleCommand::Open(name) => handle.select_label(name).await?,
        ConsoleCommand::New(name) => match handle.create_label(name).await? {
            CreateOutcome::Declined => println!("Nothing created"),
            CreateOutcome::Created | CreateOutcome::OpenedExisting => {}
        },
        ConsoleCommand::Set(text) => edit(buffer.replace_all(&text)),
        ConsoleCommand::Append(text) => {
            let separator = if buffer.text().is_empty() { "" } else { "\n" };
            edit(buffer.append(&format!("{}{}", separator, text)));
        }
        ConsoleCommand::Undo => {
            if !buffer.undo() {
                println!("Nothing to undo");
            }
        }
        ConsoleCommand::Show => println!("{}", buffer.text()),
        ConsoleCommand::Save => {
            if handle.save().await? == SaveOutcome::NothingToSave {
                println!("Nothing to save");
            }
        }
        ConsoleCommand::Status => println!("{}", handle.status().status_line()),
        ConsoleCommand::Reload => {
            handle.reload_directory().await?;
        }
        ConsoleCommand::Help => println!("{}", HELP),
        ConsoleCommand::Quit => {}
    }
    Ok(())
}

fn edit(applied: bool) {
    if !applied {
        println!("Buffer is read-only or unchanged (open a text label first)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::domain::messages::Action;
    use crate::app::services::store::StoreError;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse_command("save"), Ok(Some(ConsoleCommand::Save)));
        assert_eq!(parse_command("  quit  "), Ok(Some(ConsoleCommand::Quit)));
        assert_eq!(parse_command(""), Ok(None));
        assert_eq!(parse_command("   "), Ok(None));
    }

    #[test]
    fn test_parse_arguments() {
        assert_eq!(
            parse_command("open notes/todo list.md"),
            Ok(Some(ConsoleCommand::Open("notes/todo list.md".to_string())))
        );
        assert_eq!(
            parse_command("ls"),
            Ok(Some(ConsoleCommand::List(String::new())))
        );
        assert_eq!(
            parse_command("ls  MD "),
            Ok(Some(ConsoleCommand::List("MD".to_string())))
        );
        // `set` with no text clears the buffer
        assert_eq!(
            parse_command("set"),
            Ok(Some(ConsoleCommand::Set(String::new())))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_command("open").unwrap_err().contains("requires"));
        assert!(parse_command("new   ").is_err());
        assert!(parse_command("frobnicate").unwrap_err().contains("Unknown"));
    }

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("n"));
        assert!(!is_yes("maybe"));
    }

    #[test]
    fn test_describe_notice() {
        let label = LabelName::new("logo.png").unwrap();
        let text = describe_notice(&Notice::OpenedBinary {
            label: label.clone(),
            size_bytes: 2048,
        });
        assert_eq!(text, "logo.png is binary (2.0 KB); it can't be edited here");

        let text = describe_notice(&Notice::Failed {
            action: Action::Autosave,
            label: Some(label),
            error: StoreError::RemoteUnavailable("timeout".to_string()),
        });
        assert_eq!(text, "Error autosaving logo.png: Store unavailable: timeout");

        let text = describe_notice(&Notice::Failed {
            action: Action::ListLabels,
            label: None,
            error: StoreError::RemoteUnavailable("refused".to_string()),
        });
        assert_eq!(text, "Error listing labels: Store unavailable: refused");
    }
}
