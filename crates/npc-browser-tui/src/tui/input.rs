// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into UserCommand messages for the
// orchestrator, or into local ViewState mutations (search text, facet and
// list selection).

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::ViewState;
use crate::protocol::UserCommand;

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press should be forwarded to the
/// orchestrator; `None` when it was handled locally.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // crossterm emits Release events on some platforms
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    if key_event.modifiers.contains(KeyModifiers::CONTROL) && key_event.code == KeyCode::Char('c')
    {
        return Some(UserCommand::Quit);
    }

    if view_state.dialog.is_some() {
        return handle_dialog_key(key_event, view_state);
    }

    match key_event.code {
        KeyCode::Char('q') => Some(UserCommand::Quit),
        KeyCode::Char(c) if view_state.shortcuts.iter().any(|(key, _)| *key == c) => {
            Some(UserCommand::RunShortcut(c))
        }
        KeyCode::Char('b') => Some(UserCommand::Browse),
        _ => None,
    }
}

/// Keys while the NPC browser dialog is open. Everything printable goes to
/// the search box.
fn handle_dialog_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    let dialog = view_state.dialog.as_mut()?;

    if key_event.code == KeyCode::Esc {
        dialog.session.close();
        view_state.dialog = None;
        return Some(UserCommand::CloseBrowser);
    }

    match key_event.code {
        KeyCode::Char(c) => dialog.push_char(c),
        KeyCode::Backspace => dialog.backspace(),
        KeyCode::Tab => dialog.cycle_facet(true),
        KeyCode::BackTab => dialog.cycle_facet(false),
        KeyCode::Up => dialog.move_selection(false),
        KeyCode::Down => dialog.move_selection(true),
        KeyCode::Enter => {
            return dialog
                .selected_record()
                .map(|record| UserCommand::Post(Box::new(record.clone())));
        }
        _ => {}
    }
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
