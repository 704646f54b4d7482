use std::sync::Arc;

use label_pad::app::controllers::{ControllerConfig, SyncController};
use label_pad::app::domain::settings::Settings;
use label_pad::app::infrastructure::buffer::MemoryBuffer;
use label_pad::app::infrastructure::logging::init_logging;
use label_pad::app::services::store::{HttpStoreClient, MemoryStore, StoreClient};
use label_pad::ui::console::{ConsolePresenter, run_console, stdin_lines};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let (settings, load_failure) = Settings::load_or_default();
    let mut settings = settings.with_env_overrides();
    init_logging(&settings.log_filter);
    if let Some(e) = load_failure {
        tracing::warn!("Failed to load settings: {}. Using defaults.", e);
    }

    let mut use_memory = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--memory" => use_memory = true,
            "-h" | "--help" => {
                println!("Usage: labelpad [SERVER_URL] [--memory]");
                return;
            }
            url => settings.server_url = url.to_string(),
        }
    }

    let store: Arc<dyn StoreClient> = if use_memory {
        Arc::new(MemoryStore::with_labels([(
            "welcome.md",
            "# Welcome\n\nThis store lives in memory and is gone on exit.\n",
        )]))
    } else {
        match HttpStoreClient::new(&settings.server_url, settings.request_timeout_secs) {
            Ok(client) => Arc::new(client),
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(2);
            }
        }
    };

    let input = stdin_lines();
    let buffer = MemoryBuffer::new();
    let presenter = Arc::new(ConsolePresenter::new(input.clone()));
    let (controller, handle) = SyncController::new(
        store,
        Box::new(buffer.clone()),
        presenter,
        ControllerConfig::from(&settings),
    );
    let controller = tokio::spawn(controller.run());

    if let Err(e) = run_console(handle, buffer, input).await {
        eprintln!("Console error: {}", e);
    }
    let _ = controller.await;
}
