// Application orchestrator.
//
// Owns the `NpcBrowser` and runs its entry points in response to
// `UserCommand`s from the TUI. Fetches run in spawned tasks; their results
// come back as `BrowseEvent`s tagged with the generation they were started
// under, and results for a superseded or closed browse are dropped.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use npc_browser_core::browser::{browse_macro_command, keys, NpcBrowser};
use npc_browser_core::model::NpcRecord;
use npc_browser_core::session::BrowseSession;

use crate::adapters::{CapturedDialog, ShortcutRegistry};
use crate::protocol::{UiUpdate, UserCommand};

/// Result of a background browse task.
#[derive(Debug)]
pub struct BrowseEvent {
    pub generation: u64,
    pub title: String,
    pub session: Option<BrowseSession>,
}

pub struct AppState {
    pub browser: Arc<NpcBrowser>,
    pub shortcuts: Arc<ShortcutRegistry>,
    /// Incremented on every browse and every close. Events carrying an
    /// older value are stale.
    pub browse_generation: u64,
    browse_task: Option<JoinHandle<()>>,
    browse_tx: mpsc::Sender<BrowseEvent>,
}

impl AppState {
    pub fn new(
        browser: Arc<NpcBrowser>,
        shortcuts: Arc<ShortcutRegistry>,
        browse_tx: mpsc::Sender<BrowseEvent>,
    ) -> Self {
        AppState {
            browser,
            shortcuts,
            browse_generation: 0,
            browse_task: None,
            browse_tx,
        }
    }

    /// Start a browse in the background. Returns the new generation.
    pub fn start_browse(&mut self) -> u64 {
        self.cancel_browse();
        self.browse_generation += 1;
        let generation = self.browse_generation;

        let browser = Arc::clone(&self.browser);
        let tx = self.browse_tx.clone();
        let handle = tokio::spawn(async move {
            let dialog = CapturedDialog::default();
            let session = browser.show_npc_browser(&dialog).await;
            let title = dialog
                .title()
                .unwrap_or_else(|| browser.text(keys::BROWSER_TITLE));
            let _ = tx
                .send(BrowseEvent {
                    generation,
                    title,
                    session,
                })
                .await;
        });
        self.browse_task = Some(handle);
        generation
    }

    /// Invalidate the current browse. A fetch still in flight is left to
    /// finish; its result will not match the generation.
    pub fn close_browse(&mut self) {
        self.browse_generation += 1;
        self.browse_task = None;
    }

    pub fn cancel_browse(&mut self) {
        if let Some(handle) = self.browse_task.take() {
            handle.abort();
        }
    }
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the orchestrator until the TUI quits or drops its command sender.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    mut browse_rx: mpsc::Receiver<BrowseEvent>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");

    let bindings = state
        .shortcuts
        .bindings()
        .into_iter()
        .map(|(key, name, _)| (key, name))
        .collect();
    let _ = ui_tx.send(UiUpdate::Shortcuts(bindings)).await;

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => handle_user_command(&mut state, cmd, &ui_tx).await,
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }

            Some(event) = browse_rx.recv() => {
                handle_browse_event(&mut state, event, &ui_tx).await;
            }
        }
    }

    state.cancel_browse();
    info!("Application event loop exiting");
    Ok(())
}

async fn handle_user_command(
    state: &mut AppState,
    cmd: UserCommand,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    match cmd {
        UserCommand::Browse => browse(state, ui_tx).await,
        UserCommand::RunShortcut(key) => {
            let command = state
                .shortcuts
                .bindings()
                .into_iter()
                .find(|(bound, _, _)| *bound == key)
                .map(|(_, _, command)| command);
            match command {
                Some(command) if command == browse_macro_command() => browse(state, ui_tx).await,
                Some(command) => warn!(key = %key, command = %command, "unknown shortcut command"),
                None => debug!(key = %key, "no shortcut bound"),
            }
        }
        UserCommand::CloseBrowser => {
            state.close_browse();
            debug!(generation = state.browse_generation, "browser closed");
        }
        UserCommand::Post(record) => post(state, &record).await,
        UserCommand::Quit => {
            // Handled in the main loop
        }
    }
}

async fn browse(state: &mut AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    let generation = state.start_browse();
    info!(generation, "browse started");
    let _ = ui_tx.send(UiUpdate::BrowseStarted { generation }).await;
}

async fn post(state: &AppState, record: &NpcRecord) {
    if !state.browser.post_npc_to_chat(record).await {
        debug!(npc = %record.name, "post was not accepted");
    }
}

async fn handle_browse_event(
    state: &mut AppState,
    event: BrowseEvent,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    if event.generation != state.browse_generation {
        debug!(
            "Discarding stale browse result (event gen: {}, current gen: {})",
            event.generation, state.browse_generation
        );
        return;
    }
    state.browse_task = None;

    let update = match event.session {
        Some(session) => UiUpdate::BrowserOpened {
            generation: event.generation,
            title: event.title,
            session: Box::new(session),
        },
        None => UiUpdate::BrowseFailed {
            generation: event.generation,
        },
    };
    let _ = ui_tx.send(update).await;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use npc_browser_core::browser::BrowserPorts;
    use npc_browser_core::error::BrowserError;
    use npc_browser_core::host::{
        ChatFeed, ChatMessage, HostError, HostUser, HttpResponse, HttpSource, MemorySettings,
        NoLocalization, Notifier, Severity,
    };
    use std::sync::Mutex;

    struct StaticHttp(&'static str);

    #[async_trait::async_trait]
    impl HttpSource for StaticHttp {
        async fn get(&self, _url: &str) -> Result<HttpResponse, BrowserError> {
            Ok(HttpResponse {
                status: 200,
                body: self.0.to_string(),
            })
        }
    }

    #[derive(Default)]
    struct Notes(Mutex<Vec<(Severity, String)>>);

    impl Notifier for Notes {
        fn notify(&self, severity: Severity, message: &str) {
            self.0.lock().unwrap().push((severity, message.to_string()));
        }
    }

    #[derive(Default)]
    struct Chat(Mutex<Vec<ChatMessage>>);

    #[async_trait::async_trait]
    impl ChatFeed for Chat {
        async fn post(&self, message: ChatMessage) -> Result<(), HostError> {
            self.0.lock().unwrap().push(message);
            Ok(())
        }
    }

    const BODY: &str = r#"{ "data": [
        { "id": 1, "attributes": { "name": "Goblin", "campanha": "A" } },
        { "id": 2, "attributes": { "name": "Orc", "campanha": "B" } }
    ] }"#;

    fn state(body: &'static str, chat: Arc<Chat>) -> (AppState, mpsc::Receiver<BrowseEvent>) {
        let ports = BrowserPorts {
            http: Arc::new(StaticHttp(body)),
            settings: Arc::new(MemorySettings::new()),
            notifier: Arc::new(Notes::default()),
            chat,
            localizer: Arc::new(NoLocalization),
        };
        let user = HostUser {
            id: "gm-1".into(),
            name: "Gamemaster".into(),
            is_gm: true,
        };
        let (browse_tx, browse_rx) = mpsc::channel(4);
        let state = AppState::new(
            Arc::new(NpcBrowser::new(ports, user)),
            Arc::new(ShortcutRegistry::new()),
            browse_tx,
        );
        (state, browse_rx)
    }

    #[tokio::test]
    async fn browse_produces_opened_session() {
        let (mut state, mut browse_rx) = state(BODY, Arc::new(Chat::default()));
        let (ui_tx, mut ui_rx) = mpsc::channel(8);

        handle_user_command(&mut state, UserCommand::Browse, &ui_tx).await;
        assert!(matches!(
            ui_rx.recv().await,
            Some(UiUpdate::BrowseStarted { generation: 1 })
        ));

        let event = browse_rx.recv().await.unwrap();
        handle_browse_event(&mut state, event, &ui_tx).await;
        match ui_rx.recv().await {
            Some(UiUpdate::BrowserOpened {
                generation,
                title,
                session,
            }) => {
                assert_eq!(generation, 1);
                assert_eq!(title, "NPC Browser");
                assert_eq!(session.records().len(), 2);
            }
            other => panic!("unexpected update: {other:?}"),
        }
    }

    #[tokio::test]
    async fn result_after_close_is_discarded() {
        let (mut state, mut browse_rx) = state(BODY, Arc::new(Chat::default()));
        let (ui_tx, mut ui_rx) = mpsc::channel(8);

        handle_user_command(&mut state, UserCommand::Browse, &ui_tx).await;
        let _ = ui_rx.recv().await;
        handle_user_command(&mut state, UserCommand::CloseBrowser, &ui_tx).await;

        let event = browse_rx.recv().await.unwrap();
        assert_eq!(event.generation, 1);
        handle_browse_event(&mut state, event, &ui_tx).await;
        assert!(ui_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn empty_batch_reports_failure() {
        let (mut state, mut browse_rx) = state(r#"{ "data": [] }"#, Arc::new(Chat::default()));
        let (ui_tx, mut ui_rx) = mpsc::channel(8);

        state.start_browse();
        let event = browse_rx.recv().await.unwrap();
        assert!(event.session.is_none());
        handle_browse_event(&mut state, event, &ui_tx).await;
        assert!(matches!(
            ui_rx.recv().await,
            Some(UiUpdate::BrowseFailed { generation: 1 })
        ));
    }

    #[tokio::test]
    async fn post_command_reaches_chat() {
        let chat = Arc::new(Chat::default());
        let (mut state, _browse_rx) = state(BODY, Arc::clone(&chat));
        let (ui_tx, _ui_rx) = mpsc::channel(8);

        let record = NpcRecord {
            id: npc_browser_core::model::NpcId::Int(7),
            name: "Orc".into(),
            content: String::new(),
            campaign: String::new(),
            group: String::new(),
            image_url: String::new(),
        };
        handle_user_command(&mut state, UserCommand::Post(Box::new(record)), &ui_tx).await;

        let posted = chat.0.lock().unwrap();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].speaker, "Gamemaster");
        assert!(posted[0].content.contains("Orc"));
    }

    #[tokio::test]
    async fn browse_shortcut_starts_a_browse() {
        let (mut state, _browse_rx) = state(BODY, Arc::new(Chat::default()));
        let (ui_tx, mut ui_rx) = mpsc::channel(8);
        assert!(state.browser.ensure_browse_macro(state.shortcuts.as_ref()).await);

        handle_user_command(&mut state, UserCommand::RunShortcut('b'), &ui_tx).await;
        assert!(matches!(
            ui_rx.recv().await,
            Some(UiUpdate::BrowseStarted { .. })
        ));

        handle_user_command(&mut state, UserCommand::RunShortcut('z'), &ui_tx).await;
        assert!(ui_rx.try_recv().is_err());
    }
}
