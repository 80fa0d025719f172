// NpcBrowser: the externally invocable entry points.
//
// Wires fetcher, session, and publisher to the host ports. Every entry point
// catches its own failures, emits exactly one user-facing notification for
// them, and hands back an empty/neutral result instead of an error.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::{self, MODULE_ID};
use crate::error::BrowserError;
use crate::fetch::NpcFetcher;
use crate::host::{
    localized, ChatFeed, DialogHost, HostUser, HttpSource, Localizer, MacroRegistry, MacroSpec,
    Notifier, SettingsStore, Severity,
};
use crate::model::NpcRecord;
use crate::publish::Publisher;
use crate::session::BrowseSession;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Name of the shortcut registered for moderators.
pub const BROWSE_MACRO_NAME: &str = "Browse Strapi NPCs";

/// Icon attached to the shortcut.
pub const BROWSE_MACRO_IMG: &str = "icons/svg/mystery-man.svg";

/// Localization keys and their built-in fallbacks.
pub mod keys {
    pub const BROWSE_NPCS: (&str, &str) = ("STRAPI_NPC.BrowseNpcs", "Browse NPCs");
    pub const BROWSER_TITLE: (&str, &str) = ("STRAPI_NPC.BrowserTitle", "NPC Browser");
    pub const FETCHING: (&str, &str) = ("STRAPI_NPC.FetchingNpcs", "Fetching NPCs...");
    pub const FETCH_ERROR: (&str, &str) = ("STRAPI_NPC.FetchError", "Error fetching NPCs");
    pub const NO_NPCS: (&str, &str) = ("STRAPI_NPC.NoNpcsFound", "No NPCs found");
    pub const NPC_POSTED: (&str, &str) = ("STRAPI_NPC.NpcPosted", "NPC posted to chat");
    pub const CHAT_ERROR: (&str, &str) = ("STRAPI_NPC.ChatError", "Error posting to chat");
    pub const MACRO_CREATED: (&str, &str) = ("STRAPI_NPC.MacroCreated", "Macro created");
}

/// Command string stored in the shortcut; hosts dispatch it to
/// [`NpcBrowser::show_npc_browser`].
pub fn browse_macro_command() -> String {
    format!("{MODULE_ID}.showNpcBrowser")
}

// ---------------------------------------------------------------------------
// Ports bundle
// ---------------------------------------------------------------------------

/// Host collaborators required at construction.
#[derive(Clone)]
pub struct BrowserPorts {
    pub http: Arc<dyn HttpSource>,
    pub settings: Arc<dyn SettingsStore>,
    pub notifier: Arc<dyn Notifier>,
    pub chat: Arc<dyn ChatFeed>,
    pub localizer: Arc<dyn Localizer>,
}

// ---------------------------------------------------------------------------
// NpcBrowser
// ---------------------------------------------------------------------------

pub struct NpcBrowser {
    fetcher: NpcFetcher<Arc<dyn HttpSource>>,
    publisher: Publisher<Arc<dyn ChatFeed>>,
    settings: Arc<dyn SettingsStore>,
    notifier: Arc<dyn Notifier>,
    localizer: Arc<dyn Localizer>,
    user: HostUser,
}

impl NpcBrowser {
    pub fn new(ports: BrowserPorts, user: HostUser) -> Self {
        NpcBrowser {
            fetcher: NpcFetcher::new(ports.http),
            publisher: Publisher::new(ports.chat),
            settings: ports.settings,
            notifier: ports.notifier,
            localizer: ports.localizer,
            user,
        }
    }

    pub fn user(&self) -> &HostUser {
        &self.user
    }

    /// Declare the `apiUrl` world setting.
    pub fn register_settings(&self) {
        self.settings.register(&config::api_url_setting());
    }

    pub fn base_url(&self) -> String {
        config::resolve_base_url(self.settings.as_ref())
    }

    /// Localized text for one of the [`keys`].
    pub fn text(&self, key: (&str, &str)) -> String {
        localized(self.localizer.as_ref(), key.0, key.1)
    }

    // -- Entry points ------------------------------------------------------

    /// Fetch every NPC. On failure: log, notify once, return an empty batch.
    pub async fn fetch_npcs(&self) -> Vec<NpcRecord> {
        match self.fetcher.fetch_all(&self.base_url()).await {
            Ok(records) => records,
            Err(e) => {
                self.report_fetch_error(&e);
                Vec::new()
            }
        }
    }

    /// Fetch a batch for a new browse session.
    ///
    /// Returns `None` after notifying when the fetch failed (error) or came
    /// back empty (warning).
    pub async fn load_batch(&self) -> Option<Vec<NpcRecord>> {
        self.notify(Severity::Info, &self.text(keys::FETCHING));

        let records = match self.fetcher.fetch_all(&self.base_url()).await {
            Ok(records) => records,
            Err(e) => {
                self.report_fetch_error(&e);
                return None;
            }
        };

        if records.is_empty() {
            let e = BrowserError::EmptyResult;
            warn!(error = %e, "browse returned no records");
            self.notify(e.severity(), &self.text(keys::NO_NPCS));
            return None;
        }

        Some(records)
    }

    /// Fetch, build a populated session, and ask the host to open the dialog.
    ///
    /// Returns `None` (no dialog) when nothing could be loaded.
    pub async fn show_npc_browser(&self, dialogs: &dyn DialogHost) -> Option<BrowseSession> {
        let records = self.load_batch().await?;
        let session = BrowseSession::with_batch(records);

        let title = self.text(keys::BROWSER_TITLE);
        if let Err(e) = dialogs.open(&title, &session.dialog_context()) {
            error!(error = %e, "failed to open NPC browser dialog");
            self.notify(Severity::Error, &format!("{title}: {e}"));
            return None;
        }

        info!(
            npcs = session.records().len(),
            campaigns = session.campaigns().len(),
            "NPC browser opened"
        );
        Some(session)
    }

    /// Post `record` to chat. Returns whether the host accepted the entry.
    pub async fn post_npc_to_chat(&self, record: &NpcRecord) -> bool {
        match self.publisher.publish(record, &self.user).await {
            Ok(()) => {
                let msg = format!("{}: {}", self.text(keys::NPC_POSTED), record.name);
                self.notify(Severity::Info, &msg);
                true
            }
            Err(e) => {
                error!(npc = %record.name, error = %e, "error posting to chat");
                let msg = format!("{}: {e}", self.text(keys::CHAT_ERROR));
                self.notify(e.severity(), &msg);
                false
            }
        }
    }

    /// Register the browse shortcut once, for moderators only.
    ///
    /// Returns whether a shortcut was created.
    pub async fn ensure_browse_macro(&self, registry: &dyn MacroRegistry) -> bool {
        if !self.user.is_gm {
            return false;
        }

        match registry.exists(BROWSE_MACRO_NAME).await {
            Ok(true) => return false,
            Ok(false) => {}
            Err(e) => {
                warn!(error = %e, "could not look up browse shortcut");
                return false;
            }
        }

        let spec = MacroSpec {
            name: BROWSE_MACRO_NAME.to_string(),
            command: browse_macro_command(),
            img: BROWSE_MACRO_IMG.to_string(),
        };
        if let Err(e) = registry.create(spec).await {
            warn!(error = %e, "could not create browse shortcut");
            return false;
        }

        let msg = format!("{}: {BROWSE_MACRO_NAME}", self.text(keys::MACRO_CREATED));
        self.notify(Severity::Info, &msg);
        true
    }

    // -- Helpers -----------------------------------------------------------

    fn report_fetch_error(&self, e: &BrowserError) {
        error!(error = %e, "error fetching NPCs");
        let msg = format!("{}: {e}", self.text(keys::FETCH_ERROR));
        self.notify(e.severity(), &msg);
    }

    fn notify(&self, severity: Severity, message: &str) {
        self.notifier.notify(severity, message);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
