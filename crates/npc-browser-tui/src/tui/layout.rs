// Screen layout: panel arrangement and sizing.
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// +--------------------------------------------------+
// | Chat Log (fill)                                   |
// |                                                   |
// +--------------------------------------------------+
// | Notification (1 row)                              |
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+
//
// The NPC browser dialog is drawn on top of everything when open.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Resolved screen areas.
#[derive(Debug, Clone)]
pub struct AppLayout {
    pub status_bar: Rect,
    pub chat_panel: Rect,
    pub notification: Rect,
    pub help_bar: Rect,
}

pub fn build_layout(area: Rect) -> AppLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Min(3),    // chat log
            Constraint::Length(1), // notification
            Constraint::Length(1), // help bar
        ])
        .split(area);

    AppLayout {
        status_bar: vertical[0],
        chat_panel: vertical[1],
        notification: vertical[2],
        help_bar: vertical[3],
    }
}
