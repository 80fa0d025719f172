// NPC browser entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Create mpsc channels and host adapters
// 4. Build the NpcBrowser, register settings, ensure the browse shortcut
// 5. Spawn app logic task
// 6. Run the TUI until the user quits
// 7. Cleanup on exit

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{error, info};

use npc_browser_core::browser::{BrowserPorts, NpcBrowser};
use npc_browser_core::config::{self, API_URL_SETTING};
use npc_browser_core::fetch::ReqwestSource;
use npc_browser_core::host::{MemorySettings, NoLocalization};
use npc_browser_tui::adapters::{load_chat_log, ChannelNotifier, JsonlChatFeed, ShortcutRegistry};
use npc_browser_tui::app;
use npc_browser_tui::tui;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("NPC browser starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: api_url={}, user={} (gm: {})",
        config.world.api_url, config.user.name, config.user.is_gm
    );

    // 3. Channels and adapters
    let (ui_tx, ui_rx) = mpsc::channel(256);
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (browse_tx, browse_rx) = mpsc::channel(16);

    let http = match config.http.timeout_secs {
        Some(secs) => ReqwestSource::with_timeout(Duration::from_secs(secs)),
        None => ReqwestSource::new(),
    };
    let settings =
        Arc::new(MemorySettings::new().with_value(API_URL_SETTING, config.world.api_url.clone()));
    let chat_history = load_chat_log(config.chat.log_path.as_ref());
    info!("Loaded {} chat entries from {}", chat_history.len(), config.chat.log_path);

    let ports = BrowserPorts {
        http: Arc::new(http),
        settings,
        notifier: Arc::new(ChannelNotifier::new(ui_tx.clone())),
        chat: Arc::new(JsonlChatFeed::new(&config.chat.log_path, ui_tx.clone())),
        localizer: Arc::new(NoLocalization),
    };

    // 4. Browser, settings, shortcut
    let browser = Arc::new(NpcBrowser::new(ports, config.user.clone()));
    browser.register_settings();
    info!("NPC API base URL: {}", browser.base_url());

    let shortcuts = Arc::new(ShortcutRegistry::new());
    if browser.ensure_browse_macro(shortcuts.as_ref()).await {
        info!("Browse shortcut registered");
    }

    // 5. Spawn app logic task
    let app_state = app::AppState::new(browser, shortcuts, browse_tx);
    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(cmd_rx, browse_rx, ui_tx, app_state).await {
            error!("Application loop error: {}", e);
        }
    });

    // 6. Run the TUI event loop (blocking until user quits)
    let view_state = tui::ViewState::new(config.user.name.clone(), chat_history);
    if let Err(e) = tui::run(ui_rx, cmd_tx, view_state).await {
        error!("TUI error: {}", e);
    }

    // 7. Cleanup: wait for app task to finish (with timeout)
    let _ = tokio::time::timeout(Duration::from_secs(5), async {
        let _ = app_handle.await;
    })
    .await;

    info!("NPC browser shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to a file (not the terminal, which is used by the TUI).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("npc-browser.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("npc_browser=info,npc_browser_tui=info,npc_browser_core=info,warn")
        }))
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
