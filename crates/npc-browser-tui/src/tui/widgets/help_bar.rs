// Help bar widget: key hints for the current mode.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let paragraph = Paragraph::new(Line::from(Span::styled(
        help_text(state),
        Style::default().fg(Color::White).add_modifier(Modifier::DIM),
    )))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

pub fn help_text(state: &ViewState) -> String {
    match &state.dialog {
        Some(dialog) if dialog.is_loading() => " Esc:Close".to_string(),
        Some(_) => " type:Search | Tab/S-Tab:Campaign | ↑↓:Select | Enter:Post | Esc:Close".to_string(),
        None => {
            let mut text = String::new();
            for (key, name) in &state.shortcuts {
                text.push_str(&format!(" {key}:{name} |"));
            }
            if !state.shortcuts.iter().any(|(key, _)| *key == 'b') {
                text.push_str(" b:Browse |");
            }
            text.push_str(" q:Quit");
            text
        }
    }
}
