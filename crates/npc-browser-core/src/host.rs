// Host ports: everything the pipeline needs from the surrounding application.
//
// The core never reaches for ambient globals. Notifications, chat, settings,
// localization, shortcut registration, dialog rendering, and the HTTP
// transport are all handed in as trait objects at construction.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::error::BrowserError;
use crate::template::DialogContext;

// ---------------------------------------------------------------------------
// Shared types
// ---------------------------------------------------------------------------

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Failure reported by a host collaborator.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("rejected by host: {0}")]
    Rejected(String),

    #[error("host unavailable: {0}")]
    Unavailable(String),
}

/// The user on whose behalf the browser acts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostUser {
    pub id: String,
    pub name: String,
    /// Game-moderator role. Only moderators get the browse shortcut.
    #[serde(default)]
    pub is_gm: bool,
}

/// One entry appended to the shared chat feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub user_id: String,
    pub speaker: String,
    /// Pre-rendered HTML fragment.
    pub content: String,
}

/// Raw HTTP answer as seen by the fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A named shortcut that invokes the browse entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroSpec {
    pub name: String,
    pub command: String,
    pub img: String,
}

/// Where a registered setting lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingScope {
    World,
}

/// Declaration of a configurable setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingDef {
    pub key: &'static str,
    pub name: &'static str,
    pub hint: &'static str,
    pub scope: SettingScope,
    pub default: String,
}

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpSource: Send + Sync {
    /// Issue a GET and return status plus body, or `BrowserError::Transport`
    /// when no response was received.
    async fn get(&self, url: &str) -> Result<HttpResponse, BrowserError>;
}

#[async_trait]
impl<T: HttpSource + ?Sized> HttpSource for Arc<T> {
    async fn get(&self, url: &str) -> Result<HttpResponse, BrowserError> {
        (**self).get(url).await
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    fn notify(&self, severity: Severity, message: &str);
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatFeed: Send + Sync {
    async fn post(&self, message: ChatMessage) -> Result<(), HostError>;
}

#[async_trait]
impl<T: ChatFeed + ?Sized> ChatFeed for Arc<T> {
    async fn post(&self, message: ChatMessage) -> Result<(), HostError> {
        (**self).post(message).await
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait SettingsStore: Send + Sync {
    /// Declare a setting. Existing values are kept; absent ones take the default.
    fn register(&self, setting: &SettingDef);
    fn get(&self, key: &str) -> Option<String>;
}

#[cfg_attr(test, mockall::automock)]
pub trait Localizer: Send + Sync {
    fn localize(&self, key: &str) -> Option<String>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MacroRegistry: Send + Sync {
    async fn exists(&self, name: &str) -> Result<bool, HostError>;
    async fn create(&self, spec: MacroSpec) -> Result<(), HostError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait DialogHost: Send + Sync {
    /// Render the browser dialog from `context` under `title`.
    fn open(&self, title: &str, context: &DialogContext) -> Result<(), HostError>;
}

// ---------------------------------------------------------------------------
// Small stock implementations
// ---------------------------------------------------------------------------

/// Localizer with no catalog: every lookup falls back to the built-in text.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLocalization;

impl Localizer for NoLocalization {
    fn localize(&self, _key: &str) -> Option<String> {
        None
    }
}

/// Look `key` up through `localizer`, falling back to `fallback` when the
/// catalog has no (or an empty) entry.
pub fn localized(localizer: &dyn Localizer, key: &str, fallback: &str) -> String {
    match localizer.localize(key) {
        Some(text) if !text.trim().is_empty() => text,
        _ => fallback.to_string(),
    }
}

/// In-process settings store, seeded from configuration.
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value before (or after) registration.
    pub fn with_value(self, key: &str, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&self, key: &str, value: impl Into<String>) {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value.into());
    }
}

impl SettingsStore for MemorySettings {
    fn register(&self, setting: &SettingDef) {
        debug!(
            key = setting.key,
            name = setting.name,
            hint = setting.hint,
            scope = ?setting.scope,
            "setting registered"
        );
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values
            .entry(setting.key.to_string())
            .or_insert_with(|| setting.default.clone());
    }

    fn get(&self, key: &str) -> Option<String> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.get(key).cloned()
    }
}
