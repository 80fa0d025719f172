// Publisher: render an NPC as a chat card and append it to the chat feed.

use std::fmt::Write as _;

use tracing::{info, warn};

use crate::error::BrowserError;
use crate::host::{ChatFeed, ChatMessage, HostUser};
use crate::model::NpcRecord;

/// Placeholder paragraph for NPCs without a description.
pub const NO_DESCRIPTION: &str = "No description available";

/// Render the chat card HTML for `record`.
///
/// Campaign and group lines appear only when they carry visible text; the
/// content paragraph is always present.
pub fn render_chat_card(record: &NpcRecord) -> String {
    let name = escape_html(&record.name);
    let mut html = String::new();

    html.push_str("<div class=\"strapi-npc-chat-card\">\n");
    html.push_str("  <div class=\"npc-header\">\n");
    let _ = writeln!(
        html,
        "    <img src=\"{}\" alt=\"{name}\" class=\"npc-portrait\" />",
        escape_html(&record.image_url)
    );
    html.push_str("    <div class=\"npc-title-info\">\n");
    let _ = writeln!(html, "      <h3 class=\"npc-name\">{name}</h3>");
    if !record.campaign.trim().is_empty() {
        let _ = writeln!(
            html,
            "      <div class=\"npc-meta\"><strong>Campanha:</strong> {}</div>",
            escape_html(&record.campaign)
        );
    }
    if !record.group.trim().is_empty() {
        let _ = writeln!(
            html,
            "      <div class=\"npc-meta\"><strong>Núcleo:</strong> {}</div>",
            escape_html(&record.group)
        );
    }
    html.push_str("    </div>\n");
    html.push_str("  </div>\n");
    html.push_str("  <div class=\"npc-content\">\n");
    if record.content.is_empty() {
        let _ = writeln!(html, "    <p><em>{NO_DESCRIPTION}</em></p>");
    } else {
        let _ = writeln!(html, "    <p>{}</p>", escape_html(&record.content));
    }
    html.push_str("  </div>\n");
    html.push_str("</div>");

    html
}

/// Minimal HTML text/attribute escaping.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Posts rendered cards through a `ChatFeed`. Every call appends a new
/// entry; nothing is deduplicated and nothing is retried.
pub struct Publisher<C> {
    chat: C,
}

impl<C: ChatFeed> Publisher<C> {
    pub fn new(chat: C) -> Self {
        Self { chat }
    }

    pub async fn publish(&self, record: &NpcRecord, user: &HostUser) -> Result<(), BrowserError> {
        let message = ChatMessage {
            user_id: user.id.clone(),
            speaker: user.name.clone(),
            content: render_chat_card(record),
        };

        match self.chat.post(message).await {
            Ok(()) => {
                info!(npc = %record.name, user = %user.id, "posted NPC to chat");
                Ok(())
            }
            Err(e) => {
                warn!(npc = %record.name, error = %e, "chat post rejected");
                Err(BrowserError::Publish(e))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
