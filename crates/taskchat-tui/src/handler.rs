use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use crate::app::App;
use crate::tui::AppEvent;

const WHEEL_LINES: u16 = 3;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick_animation(),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // Global keys that work whether or not the input is enabled
    match key.code {
        KeyCode::Char('c') if ctrl => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('l') if ctrl => {
            app.conversation.dismiss_error();
            return;
        }
        KeyCode::Char('u') if ctrl => {
            app.scroll_half_page_up();
            return;
        }
        KeyCode::Char('d') if ctrl => {
            app.scroll_half_page_down();
            return;
        }
        KeyCode::Esc => {
            // First Esc clears a draft, second one quits
            if app.input.is_empty() || !app.input_enabled() {
                app.should_quit = true;
            } else {
                app.clear_input();
            }
            return;
        }
        KeyCode::Up => {
            app.scroll_up(1);
            return;
        }
        KeyCode::Down => {
            app.scroll_down(1);
            return;
        }
        KeyCode::PageUp => {
            app.scroll_half_page_up();
            return;
        }
        KeyCode::PageDown => {
            app.scroll_half_page_down();
            return;
        }
        _ => {}
    }

    if !app.input_enabled() {
        return;
    }

    match key.code {
        KeyCode::Enter => app.submit_input(),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Delete => app.delete(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),
        KeyCode::Home => app.cursor_home(),
        KeyCode::End => app.cursor_end(),
        KeyCode::Char(c) if !ctrl => app.insert_char(c),
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
        MouseEventKind::ScrollDown => app.scroll_down(WHEEL_LINES),
        MouseEventKind::ScrollUp => app.scroll_up(WHEEL_LINES),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState};
    use taskchat_core::ChatClient;

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn ctrl(c: char) -> AppEvent {
        AppEvent::Key(KeyEvent {
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn app() -> App {
        App::new(ChatClient::new("http://127.0.0.1:9"))
    }

    #[test]
    fn test_typing_fills_input() {
        let mut app = app();
        for c in "hi".chars() {
            handle_event(&mut app, key(KeyCode::Char(c)));
        }
        assert_eq!(app.input, "hi");
    }

    #[test]
    fn test_input_disabled_while_pending() {
        let mut app = app();
        app.conversation.submit("first");
        handle_event(&mut app, key(KeyCode::Char('x')));
        handle_event(&mut app, key(KeyCode::Enter));
        assert!(app.input.is_empty());
        assert!(app.send_task.is_none());
        assert_eq!(app.conversation.state().turns.len(), 1);
    }

    #[test]
    fn test_esc_clears_then_quits() {
        let mut app = app();
        handle_event(&mut app, key(KeyCode::Char('a')));
        handle_event(&mut app, key(KeyCode::Esc));
        assert!(app.input.is_empty());
        assert!(!app.should_quit);
        handle_event(&mut app, key(KeyCode::Esc));
        assert!(app.should_quit);
    }

    #[test]
    fn test_ctrl_c_quits() {
        let mut app = app();
        handle_event(&mut app, ctrl('c'));
        assert!(app.should_quit);
        assert!(app.input.is_empty());
    }

    #[test]
    fn test_ctrl_l_dismisses_error() {
        let mut app = app();
        app.conversation.submit("hello");
        app.conversation
            .on_failed(&taskchat_core::SendError::Other("boom".to_string()));
        handle_event(&mut app, ctrl('l'));
        assert_eq!(app.conversation.state().last_error, None);
    }

    #[test]
    fn test_wheel_outside_chat_ignored() {
        let mut app = app();
        app.chat_area = Some(Rect::new(0, 0, 10, 10));
        app.update_scroll_bounds(40, 10);
        app.scroll = 5;
        handle_mouse(
            &mut app,
            MouseEvent {
                kind: MouseEventKind::ScrollUp,
                column: 20,
                row: 20,
                modifiers: KeyModifiers::NONE,
            },
        );
        assert_eq!(app.scroll, 5);
        handle_mouse(
            &mut app,
            MouseEvent {
                kind: MouseEventKind::ScrollUp,
                column: 2,
                row: 2,
                modifiers: KeyModifiers::NONE,
            },
        );
        assert_eq!(app.scroll, 2);
    }
}
