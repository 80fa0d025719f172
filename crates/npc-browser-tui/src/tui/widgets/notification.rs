// Notification line: the most recent host notification, colored by severity.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use npc_browser_core::host::Severity;

pub fn render(frame: &mut Frame, area: Rect, notification: Option<&(Severity, String)>) {
    let line = match notification {
        Some((severity, message)) => {
            let (tag, color) = severity_style(*severity);
            Line::from(vec![
                Span::styled(format!(" {tag} "), Style::default().fg(Color::Black).bg(color)),
                Span::styled(format!(" {message}"), Style::default().fg(color)),
            ])
        }
        None => Line::from(""),
    };
    frame.render_widget(Paragraph::new(line), area);
}

pub fn severity_style(severity: Severity) -> (&'static str, Color) {
    match severity {
        Severity::Info => ("INFO", Color::Green),
        Severity::Warning => ("WARN", Color::Yellow),
        Severity::Error => ("ERROR", Color::Red),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severities_have_distinct_colors() {
        assert_eq!(severity_style(Severity::Info).1, Color::Green);
        assert_eq!(severity_style(Severity::Warning).1, Color::Yellow);
        assert_eq!(severity_style(Severity::Error).1, Color::Red);
    }

    #[test]
    fn render_shows_message() {
        let backend = ratatui::backend::TestBackend::new(50, 1);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let note = (Severity::Warning, "No NPCs found".to_string());
        terminal
            .draw(|frame| render(frame, frame.area(), Some(&note)))
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("WARN"));
        assert!(text.contains("No NPCs found"));
    }
}
