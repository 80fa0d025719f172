// Chat log widget: posted entries, newest at the bottom.
//
// Each entry: "[HH:MM:SS] Speaker" followed by the card's text with markup
// stripped, one line per non-empty line of the card.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::adapters::ChatEntry;

pub fn render(frame: &mut Frame, area: Rect, entries: &[ChatEntry]) {
    let block = Block::default().borders(Borders::ALL).title("Chat");

    if entries.is_empty() {
        let paragraph = Paragraph::new("  No messages yet.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let visible_rows = (area.height as usize).saturating_sub(2);
    let lines: Vec<Line> = entries.iter().flat_map(entry_lines).collect();
    let skip = lines.len().saturating_sub(visible_rows);
    let lines: Vec<Line> = lines.into_iter().skip(skip).collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn entry_lines(entry: &ChatEntry) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(vec![
        Span::styled(
            format!("[{}] ", entry.timestamp.format("%H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            entry.speaker.clone(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
    ])];
    lines.extend(
        strip_tags(&entry.content)
            .into_iter()
            .map(|text| Line::from(format!("  {text}"))),
    );
    lines
}

/// Plain-text lines of an HTML fragment: tags removed, the common entities
/// decoded, blank lines dropped.
pub fn strip_tags(html: &str) -> Vec<String> {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }

    text.lines()
        .map(|line| decode_entities(line.trim()))
        .filter(|line| !line.is_empty())
        .collect()
}

fn decode_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
