use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::App;

/// Handle a key event.
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if app.search_input.is_some() {
        handle_search_input(app, key);
        return;
    }

    // A pending key only survives the very next key press.
    let pending = app.pending_key.take();

    if app.show_help {
        handle_help(app, key);
        return;
    }

    if handle_global(app, key) {
        return;
    }

    if app.tree_focused() {
        handle_tree_keys(app, key, pending);
    } else {
        handle_content_keys(app, key, pending);
    }
}

fn is_ctrl(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
}

fn handle_search_input(app: &mut App, key: KeyEvent) {
    let ctrl = is_ctrl(&key);
    match key.code {
        KeyCode::Enter => app.submit_search(),
        KeyCode::Esc => app.cancel_search(),
        KeyCode::Char('c') if ctrl => app.cancel_search(),
        KeyCode::Backspace => app.pop_search_char(),
        KeyCode::Char(c) if !ctrl => app.push_search_char(c),
        _ => {}
    }
}

fn handle_help(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('c') if is_ctrl(&key) => app.quit(),
        KeyCode::Char('q') | KeyCode::Char('?') | KeyCode::Esc => app.show_help = false,
        _ => {}
    }
}

/// Keys that behave the same whichever pane has focus. Returns true when consumed.
fn handle_global(app: &mut App, key: KeyEvent) -> bool {
    let ctrl = is_ctrl(&key);
    match key.code {
        KeyCode::Char('c') if ctrl => app.quit(),
        KeyCode::Char('h') if ctrl => app.focus_tree(),
        KeyCode::Char('l') if ctrl => app.focus_content(),
        KeyCode::Char('q') if !ctrl => app.quit(),
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Char('t') if !ctrl => app.toggle_tree(),
        KeyCode::Char('/') => app.enter_search(),
        KeyCode::Char('n') if !ctrl => app.next_match(),
        KeyCode::Char('N') => app.previous_match(),
        _ => return false,
    }
    true
}

fn handle_tree_keys(app: &mut App, key: KeyEvent, pending: Option<char>) {
    let ctrl = is_ctrl(&key);
    match key.code {
        KeyCode::Char('d') if ctrl => app.tree_half_page(true),
        KeyCode::Char('u') if ctrl => app.tree_half_page(false),
        KeyCode::Char('j') if ctrl => app.scroll_content(1),
        KeyCode::Char('k') if ctrl => app.scroll_content(-1),
        KeyCode::Char('f') if ctrl => app.content_half_page(true),
        KeyCode::Char('b') if ctrl => app.content_half_page(false),
        _ if ctrl => {}
        KeyCode::Char('j') | KeyCode::Down => app.move_tree_selection(1),
        KeyCode::Char('k') | KeyCode::Up => app.move_tree_selection(-1),
        KeyCode::Char('l') | KeyCode::Right | KeyCode::Enter => app.expand_or_open(),
        KeyCode::Char('h') | KeyCode::Left => app.collapse_or_ascend(),
        KeyCode::Char('g') if pending == Some('g') => app.tree_select_first(),
        KeyCode::Char('g') => app.pending_key = Some('g'),
        KeyCode::Char('G') => app.tree_select_last(),
        _ => {}
    }
}

fn handle_content_keys(app: &mut App, key: KeyEvent, pending: Option<char>) {
    let ctrl = is_ctrl(&key);
    match key.code {
        KeyCode::Char('d') if ctrl => app.content_half_page(true),
        KeyCode::Char('u') if ctrl => app.content_half_page(false),
        _ if ctrl => {}
        KeyCode::Char('j') | KeyCode::Down => app.scroll_content(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_content(-1),
        KeyCode::PageDown => app.content_page(true),
        KeyCode::PageUp => app.content_page(false),
        KeyCode::Char('g') if pending == Some('g') => app.content_view.goto_top(),
        KeyCode::Char('g') => app.pending_key = Some('g'),
        KeyCode::Char('G') => app.content_view.goto_bottom(),
        _ => {}
    }
}
