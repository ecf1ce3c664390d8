use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use crate::app::App;
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Paste(text) => {
            if app.chat.input_focused() {
                app.chat.input.insert_str(&text);
            }
        }
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::Resolved(outcome) => app.resolve(outcome),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => {
                app.should_quit = true;
                return;
            }
            KeyCode::Char('l') => {
                app.clear();
                return;
            }
            KeyCode::Char('d') => {
                app.scroll_half_page_down();
                return;
            }
            KeyCode::Char('u') => {
                app.scroll_half_page_up();
                return;
            }
            _ => {}
        }
    }

    if key.code == KeyCode::PageUp {
        app.scroll_up(app.chat_height.max(1));
    } else if key.code == KeyCode::PageDown {
        app.scroll_down(app.chat_height.max(1));
    } else if app.chat.input_focused() {
        handle_input_focused(app, key);
    } else {
        handle_history_focused(app, key);
    }
}

fn handle_input_focused(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Tab => app.chat.set_input_focused(false),
        KeyCode::Enter => app.submit(),
        KeyCode::Backspace => app.chat.input.backspace(),
        KeyCode::Delete => app.chat.input.delete(),
        KeyCode::Left => app.chat.input.move_left(),
        KeyCode::Right => app.chat.input.move_right(),
        KeyCode::Home => app.chat.input.move_home(),
        KeyCode::End => app.chat.input.move_end(),
        KeyCode::Char(c) => app.chat.input.insert(c),
        _ => {}
    }
}

fn handle_history_focused(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,

        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(1),
        KeyCode::Char('g') | KeyCode::Home => app.scroll_to_top(),
        KeyCode::Char('G') | KeyCode::End => app.scroll_to_bottom(),

        KeyCode::Char('c') => app.clear(),

        KeyCode::Char('i') | KeyCode::Tab | KeyCode::Enter => app.chat.set_input_focused(true),

        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let in_chat = app
        .chat_area
        .map(|r| point_in_rect(mouse.column, mouse.row, r))
        .unwrap_or(false);
    if !in_chat {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_down(3),
        MouseEventKind::ScrollUp => app.scroll_up(3),
        _ => {}
    }
}
