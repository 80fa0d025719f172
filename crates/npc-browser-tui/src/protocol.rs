// Messages exchanged between the app orchestrator and the TUI.

use npc_browser_core::host::Severity;
use npc_browser_core::model::NpcRecord;
use npc_browser_core::session::BrowseSession;

use crate::adapters::ChatEntry;

/// App -> TUI.
#[derive(Debug)]
pub enum UiUpdate {
    /// A host notification for the status line.
    Notification { severity: Severity, message: String },
    /// A chat entry was appended to the feed.
    ChatPosted(Box<ChatEntry>),
    /// Shortcut bindings as `(key, name)`.
    Shortcuts(Vec<(char, String)>),
    /// A browse was started; the dialog shows a loading state.
    BrowseStarted { generation: u64 },
    /// The browse for `generation` produced a populated session.
    BrowserOpened {
        generation: u64,
        title: String,
        session: Box<BrowseSession>,
    },
    /// The browse for `generation` produced nothing (already notified).
    BrowseFailed { generation: u64 },
}

/// TUI -> App.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    /// Start a new browse.
    Browse,
    /// Run the shortcut bound to this key.
    RunShortcut(char),
    /// The dialog was closed; any pending fetch is stale.
    CloseBrowser,
    /// Post the record to chat.
    Post(Box<NpcRecord>),
    Quit,
}
