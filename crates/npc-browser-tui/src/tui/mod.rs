// Terminal UI: layout, input handling, and widget rendering.
//
// The TUI owns a `ViewState` holding the chat log, the last notification,
// and the open NPC browser dialog (if any). The orchestrator pushes
// `UiUpdate` messages over an mpsc channel; the TUI applies them to
// `ViewState` and re-renders at ~30 fps.

pub mod input;
pub mod layout;
pub mod widgets;

use std::time::Duration;

use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::Frame;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::debug;

use npc_browser_core::filter::CampaignFilter;
use npc_browser_core::host::Severity;
use npc_browser_core::model::NpcRecord;
use npc_browser_core::session::{BrowseSession, SessionPhase};

use crate::adapters::ChatEntry;
use crate::protocol::{UiUpdate, UserCommand};

use layout::build_layout;

// ---------------------------------------------------------------------------
// DialogView
// ---------------------------------------------------------------------------

/// The NPC browser dialog: one browse session plus its input state.
#[derive(Debug)]
pub struct DialogView {
    /// Generation of the browse that opened this dialog.
    pub generation: u64,
    pub title: String,
    pub session: BrowseSession,
    /// Template view of every record, in batch order. Built once per open.
    pub rows: Vec<Value>,
    /// Text typed into the search box.
    pub search: String,
    /// Index into `session.facets()`.
    pub facet_index: usize,
    /// Index into `session.visible_indices()`.
    pub selected: usize,
}

impl DialogView {
    pub fn loading(generation: u64) -> Self {
        DialogView {
            generation,
            title: String::new(),
            session: BrowseSession::loading(),
            rows: Vec::new(),
            search: String::new(),
            facet_index: 0,
            selected: 0,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.session.phase() == SessionPhase::Loading
    }

    /// Install the populated session from a finished browse.
    pub fn open(&mut self, title: String, session: BrowseSession) {
        self.title = title;
        self.rows = dialog_rows(&session);
        self.session = session;
        self.search.clear();
        self.facet_index = 0;
        self.selected = 0;
    }

    pub fn push_char(&mut self, c: char) {
        self.search.push(c);
        self.apply_search();
    }

    pub fn backspace(&mut self) {
        if self.search.pop().is_some() {
            self.apply_search();
        }
    }

    fn apply_search(&mut self) {
        if self.session.set_search_term(&self.search).is_ok() {
            self.clamp_selection();
        }
    }

    /// Move the facet highlight forward or back, wrapping at either end.
    pub fn cycle_facet(&mut self, forward: bool) {
        let facets = self.session.facets();
        let len = facets.len();
        let next = if forward {
            (self.facet_index + 1) % len
        } else {
            (self.facet_index + len - 1) % len
        };
        if self.session.select_campaign(facets[next].clone()).is_ok() {
            self.facet_index = next;
            self.clamp_selection();
        }
    }

    pub fn active_facet(&self) -> CampaignFilter {
        self.session.filter().campaign.clone()
    }

    pub fn move_selection(&mut self, down: bool) {
        let count = self.session.visible_indices().len();
        if count == 0 {
            self.selected = 0;
        } else if down {
            self.selected = (self.selected + 1).min(count - 1);
        } else {
            self.selected = self.selected.saturating_sub(1);
        }
    }

    fn clamp_selection(&mut self) {
        let count = self.session.visible_indices().len();
        self.selected = self.selected.min(count.saturating_sub(1));
    }

    pub fn selected_record(&self) -> Option<&NpcRecord> {
        let index = *self.session.visible_indices().get(self.selected)?;
        self.session.records().get(index)
    }
}

fn dialog_rows(session: &BrowseSession) -> Vec<Value> {
    match serde_json::to_value(session.dialog_context()) {
        Ok(Value::Object(mut context)) => match context.remove("npcs") {
            Some(Value::Array(npcs)) => npcs,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// TUI-local state, updated incrementally via `UiUpdate` messages.
#[derive(Debug, Default)]
pub struct ViewState {
    /// Display name of the acting user.
    pub user_name: String,
    pub chat: Vec<ChatEntry>,
    pub notification: Option<(Severity, String)>,
    /// Registered shortcuts as `(key, name)`.
    pub shortcuts: Vec<(char, String)>,
    pub dialog: Option<DialogView>,
}

impl ViewState {
    pub fn new(user_name: impl Into<String>, chat: Vec<ChatEntry>) -> Self {
        ViewState {
            user_name: user_name.into(),
            chat,
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

/// Apply a single UiUpdate to the ViewState.
pub fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::Notification { severity, message } => {
            state.notification = Some((severity, message));
        }
        UiUpdate::ChatPosted(entry) => {
            state.chat.push(*entry);
        }
        UiUpdate::Shortcuts(shortcuts) => {
            state.shortcuts = shortcuts;
        }
        UiUpdate::BrowseStarted { generation } => {
            state.dialog = Some(DialogView::loading(generation));
        }
        UiUpdate::BrowserOpened {
            generation,
            title,
            session,
        } => match state.dialog.as_mut() {
            Some(dialog) if dialog.generation == generation && dialog.is_loading() => {
                dialog.open(title, *session);
            }
            _ => debug!(generation, "no dialog waiting for this browse, dropping session"),
        },
        UiUpdate::BrowseFailed { generation } => {
            if state.dialog.as_ref().map(|d| d.generation) == Some(generation) {
                state.dialog = None;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

/// Render the complete screen.
pub fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area());

    widgets::status_bar::render(frame, layout.status_bar, state);
    widgets::chat_log::render(frame, layout.chat_panel, &state.chat);
    widgets::notification::render(frame, layout.notification, state.notification.as_ref());
    widgets::help_bar::render(frame, layout.help_bar, state);

    if let Some(dialog) = &state.dialog {
        widgets::npc_dialog::render(frame, frame.area(), dialog);
    }
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// Initializes the terminal, installs a panic hook that restores it, then
/// selects over UI updates, keyboard input, and render ticks until the user
/// quits or the orchestrator goes away.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
    mut view_state: ViewState,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = ratatui::restore();
        original_hook(panic_info);
    }));

    let mut event_stream = EventStream::new();

    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update),
                    None => break,
                }
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(cmd) = input::handle_key(key_event, &mut view_state) {
                            let quit = cmd == UserCommand::Quit;
                            let _ = cmd_tx.send(cmd).await;
                            if quit {
                                break;
                            }
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(_)) | None => break,
                }
            }

            _ = render_tick.tick() => {
                terminal.draw(|frame| render_frame(frame, &view_state))?;
            }
        }
    }

    ratatui::restore();

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
