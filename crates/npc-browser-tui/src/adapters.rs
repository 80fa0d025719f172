// Terminal implementations of the host ports.
//
// Notifications and chat entries are forwarded to the render loop over the
// same `UiUpdate` channel; the chat feed is persisted as JSON lines.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use npc_browser_core::host::{
    ChatFeed, ChatMessage, DialogHost, HostError, MacroRegistry, MacroSpec, Notifier, Severity,
};
use npc_browser_core::template::DialogContext;

use crate::protocol::UiUpdate;

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// Forwards notifications to the status line.
pub struct ChannelNotifier {
    tx: mpsc::Sender<UiUpdate>,
}

impl ChannelNotifier {
    pub fn new(tx: mpsc::Sender<UiUpdate>) -> Self {
        Self { tx }
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, severity: Severity, message: &str) {
        let update = UiUpdate::Notification {
            severity,
            message: message.to_string(),
        };
        if let Err(e) = self.tx.try_send(update) {
            warn!("dropping notification ({e}): {message}");
        }
    }
}

// ---------------------------------------------------------------------------
// Chat feed
// ---------------------------------------------------------------------------

/// One persisted chat entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEntry {
    pub timestamp: DateTime<Utc>,
    pub user_id: String,
    pub speaker: String,
    pub content: String,
}

/// Shared chat log backed by a JSON-lines file.
pub struct JsonlChatFeed {
    path: PathBuf,
    tx: mpsc::Sender<UiUpdate>,
}

impl JsonlChatFeed {
    pub fn new(path: impl Into<PathBuf>, tx: mpsc::Sender<UiUpdate>) -> Self {
        Self {
            path: path.into(),
            tx,
        }
    }

    async fn append(&self, entry: &ChatEntry) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }
}

#[async_trait]
impl ChatFeed for JsonlChatFeed {
    async fn post(&self, message: ChatMessage) -> Result<(), HostError> {
        let entry = ChatEntry {
            timestamp: Utc::now(),
            user_id: message.user_id,
            speaker: message.speaker,
            content: message.content,
        };

        self.append(&entry)
            .await
            .map_err(|e| HostError::Rejected(format!("{}: {e}", self.path.display())))?;

        debug!(speaker = %entry.speaker, "chat entry appended");
        let _ = self.tx.send(UiUpdate::ChatPosted(Box::new(entry))).await;
        Ok(())
    }
}

/// Read back an existing chat log. Unreadable lines are skipped.
pub fn load_chat_log(path: &Path) -> Vec<ChatEntry> {
    let Ok(text) = std::fs::read_to_string(path) else {
        return Vec::new();
    };
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match serde_json::from_str(line) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("skipping unreadable chat line: {e}");
                None
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Shortcuts
// ---------------------------------------------------------------------------

/// Keys handed out to shortcuts, in order.
const SHORTCUT_KEYS: &[char] = &['b', 'n', 'm'];

/// Named shortcuts bound to single keys.
#[derive(Default)]
pub struct ShortcutRegistry {
    bound: Mutex<Vec<(char, MacroSpec)>>,
}

impl ShortcutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(key, name, command)` for every bound shortcut.
    pub fn bindings(&self) -> Vec<(char, String, String)> {
        let bound = self.bound.lock().unwrap_or_else(|e| e.into_inner());
        bound
            .iter()
            .map(|(key, spec)| (*key, spec.name.clone(), spec.command.clone()))
            .collect()
    }
}

#[async_trait]
impl MacroRegistry for ShortcutRegistry {
    async fn exists(&self, name: &str) -> Result<bool, HostError> {
        let bound = self.bound.lock().unwrap_or_else(|e| e.into_inner());
        Ok(bound.iter().any(|(_, spec)| spec.name == name))
    }

    async fn create(&self, spec: MacroSpec) -> Result<(), HostError> {
        let mut bound = self.bound.lock().unwrap_or_else(|e| e.into_inner());
        let key = SHORTCUT_KEYS
            .iter()
            .copied()
            .find(|k| bound.iter().all(|(used, _)| used != k))
            .ok_or_else(|| HostError::Rejected("no free shortcut keys".into()))?;
        debug!(%key, name = %spec.name, img = %spec.img, "shortcut bound");
        bound.push((key, spec));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Dialog
// ---------------------------------------------------------------------------

/// Dialog port for one browse invocation: remembers the requested title so
/// the render loop can show it once the session arrives.
#[derive(Default)]
pub struct CapturedDialog {
    title: Mutex<Option<String>>,
}

impl CapturedDialog {
    pub fn title(&self) -> Option<String> {
        self.title.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl DialogHost for CapturedDialog {
    fn open(&self, title: &str, context: &DialogContext) -> Result<(), HostError> {
        debug!(
            npcs = context.npcs.len(),
            campaigns = context.campaigns.len(),
            "dialog requested"
        );
        *self.title.lock().unwrap_or_else(|e| e.into_inner()) = Some(title.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
