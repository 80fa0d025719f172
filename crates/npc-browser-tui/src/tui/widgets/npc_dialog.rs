// NPC browser overlay: search box, campaign facet row, NPC list, and a
// detail pane for the highlighted NPC.
//
// Rows and details are drawn from the session's dialog context (the same
// `{ npcs, campaigns }` JSON a host template would receive) using the
// `truncate` / `has_value` template helpers.

use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use serde_json::Value;

use npc_browser_core::publish::NO_DESCRIPTION;
use npc_browser_core::template::{has_value, truncate, truncate_str};

use crate::tui::DialogView;

/// Share of the screen the dialog covers, in percent.
const DIALOG_WIDTH_PCT: u16 = 85;
const DIALOG_HEIGHT_PCT: u16 = 80;

/// Characters of content shown in list rows and in the detail pane.
const ROW_PREVIEW_CHARS: usize = 40;
const DETAIL_CHARS: usize = 600;

pub fn render(frame: &mut Frame, area: Rect, dialog: &DialogView) {
    let dialog_area = centered_rect(
        percent_of(area.width, DIALOG_WIDTH_PCT),
        percent_of(area.height, DIALOG_HEIGHT_PCT),
        area,
    );
    frame.render_widget(Clear, dialog_area);

    let title = if dialog.title.is_empty() {
        " NPC Browser ".to_string()
    } else {
        format!(" {} ", dialog.title)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            title,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .style(Style::default().bg(Color::Black));
    let inner = block.inner(dialog_area);
    frame.render_widget(block, dialog_area);

    if dialog.is_loading() {
        let paragraph = Paragraph::new("  Fetching NPCs...").style(Style::default().fg(Color::Yellow));
        frame.render_widget(paragraph, inner);
        return;
    }

    let [search_area, facet_area, body_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Min(3),
    ])
    .areas(inner);
    let [list_area, detail_area] =
        Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)])
            .areas(body_area);

    render_search(frame, search_area, dialog);
    render_facets(frame, facet_area, dialog);

    let npcs = dialog.rows.as_slice();
    render_list(frame, list_area, dialog, npcs);

    let selected = dialog
        .session
        .visible_indices()
        .get(dialog.selected)
        .and_then(|&i| npcs.get(i));
    render_detail(frame, detail_area, selected);
}

fn render_search(frame: &mut Frame, area: Rect, dialog: &DialogView) {
    let line = Line::from(vec![
        Span::raw(dialog.search.clone()),
        Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
    ]);
    let paragraph =
        Paragraph::new(line).block(Block::default().borders(Borders::ALL).title("Search"));
    frame.render_widget(paragraph, area);
}

fn render_facets(frame: &mut Frame, area: Rect, dialog: &DialogView) {
    let active = dialog.active_facet();
    let mut spans = vec![Span::raw(" ")];
    for facet in dialog.session.facets() {
        let style = if facet == active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(format!("[{}]", facet.label()), style));
        spans.push(Span::raw(" "));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_list(frame: &mut Frame, area: Rect, dialog: &DialogView, npcs: &[Value]) {
    let visible = dialog.session.visible_indices();
    let title = format!("NPCs ({}/{})", visible.len(), npcs.len());

    let items: Vec<ListItem> = visible
        .iter()
        .filter_map(|&i| npcs.get(i))
        .map(list_row)
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut list_state = ListState::default();
    if !visible.is_empty() {
        list_state.select(Some(dialog.selected));
    }
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn list_row(npc: &Value) -> ListItem<'static> {
    let name = npc.get("name").and_then(Value::as_str).unwrap_or_default();
    let mut spans = vec![Span::raw(name.to_string())];
    if has_value(npc.get("campaign")) {
        spans.push(Span::styled(
            format!(" · {}", truncate(npc.get("campaign"), ROW_PREVIEW_CHARS)),
            Style::default().fg(Color::DarkGray),
        ));
    }
    ListItem::new(Line::from(spans))
}

fn render_detail(frame: &mut Frame, area: Rect, npc: Option<&Value>) {
    let block = Block::default().borders(Borders::ALL).title("Details");
    let Some(npc) = npc else {
        let paragraph = Paragraph::new("  No NPC selected.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    };

    let label = Style::default().add_modifier(Modifier::BOLD);
    let name = npc.get("name").and_then(Value::as_str).unwrap_or_default();
    let mut lines = vec![Line::from(Span::styled(
        truncate_str(name, ROW_PREVIEW_CHARS),
        label.fg(Color::Cyan),
    ))];
    if has_value(npc.get("campaign")) {
        lines.push(Line::from(vec![
            Span::styled("Campanha: ", label),
            Span::raw(truncate(npc.get("campaign"), ROW_PREVIEW_CHARS)),
        ]));
    }
    if has_value(npc.get("group")) {
        lines.push(Line::from(vec![
            Span::styled("Núcleo: ", label),
            Span::raw(truncate(npc.get("group"), ROW_PREVIEW_CHARS)),
        ]));
    }
    lines.push(Line::from(""));
    if has_value(npc.get("content")) {
        lines.push(Line::from(truncate(npc.get("content"), DETAIL_CHARS)));
    } else {
        lines.push(Line::from(Span::styled(
            NO_DESCRIPTION,
            Style::default().add_modifier(Modifier::ITALIC),
        )));
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn percent_of(length: u16, pct: u16) -> u16 {
    let scaled = u32::from(length) * u32::from(pct) / 100;
    u16::try_from(scaled).unwrap_or(length)
}

/// Compute a centered rectangle of the given size within `area`, clamped to
/// the available space.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let clamped_width = width.min(area.width);
    let clamped_height = height.min(area.height);

    let vertical = Layout::vertical([Constraint::Length(clamped_height)])
        .flex(Flex::Center)
        .split(area);

    let horizontal = Layout::horizontal([Constraint::Length(clamped_width)])
        .flex(Flex::Center)
        .split(vertical[0]);

    horizontal[0]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::tests::open_dialog;

    fn screen(dialog: &DialogView) -> String {
        screen_sized(dialog, 100, 30)
    }

    fn screen_sized(dialog: &DialogView, width: u16, height: u16) -> String {
        let backend = ratatui::backend::TestBackend::new(width, height);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), dialog))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn centered_rect_is_centered() {
        let area = Rect::new(0, 0, 80, 24);
        let result = centered_rect(40, 10, area);
        assert_eq!(result, Rect::new(20, 7, 40, 10));
    }

    #[test]
    fn centered_rect_clamps_to_small_area() {
        let area = Rect::new(0, 0, 10, 3);
        let result = centered_rect(40, 10, area);
        assert!(result.width <= area.width);
        assert!(result.height <= area.height);
    }

    #[test]
    fn percent_of_handles_wide_terminals() {
        assert_eq!(percent_of(100, 85), 85);
        assert_eq!(percent_of(1000, 85), 850);
        assert_eq!(percent_of(u16::MAX, 85), 55_704);
    }

    #[test]
    fn dialog_renders_on_a_very_wide_terminal() {
        let text = screen_sized(&open_dialog(), 1000, 30);
        assert!(text.contains("NPCs (3/3)"));
        assert!(text.contains("Goblin"));
    }

    #[test]
    fn loading_dialog_shows_progress() {
        let text = screen(&DialogView::loading(1));
        assert!(text.contains("Fetching NPCs..."));
    }

    #[test]
    fn populated_dialog_lists_facets_and_npcs() {
        let text = screen(&open_dialog());
        assert!(text.contains("[All]"));
        assert!(text.contains("[Ashes]"));
        assert!(text.contains("[Tides]"));
        assert!(text.contains("NPCs (3/3)"));
        assert!(text.contains("Goblin"));
        assert!(text.contains("Gnoll"));
        assert!(text.contains("Campanha: Ashes"));
    }

    #[test]
    fn filtered_dialog_counts_visible_rows() {
        let mut dialog = open_dialog();
        dialog.push_char('o');
        dialog.push_char('r');
        let text = screen(&dialog);
        assert!(text.contains("NPCs (1/3)"));
        assert!(text.contains("Orc"));
    }

    #[test]
    fn empty_filter_result_shows_no_selection() {
        let mut dialog = open_dialog();
        for c in "zzz".chars() {
            dialog.push_char(c);
        }
        let text = screen(&dialog);
        assert!(text.contains("NPCs (0/3)"));
        assert!(text.contains("No NPC selected."));
    }
}
