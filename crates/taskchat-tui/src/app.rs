use ratatui::layout::Rect;
use taskchat_core::{ChatClient, ChatReply, Conversation, SendError};
use tokio::task::JoinHandle;

pub struct App {
    pub should_quit: bool,

    // Conversation state (owned by the controller)
    pub conversation: Conversation,
    pub client: ChatClient,
    pub send_task: Option<JoinHandle<Result<ChatReply, SendError>>>,

    // Input state
    pub input: String,
    pub cursor: usize, // cursor position in input, in chars

    // Transcript scroll state
    pub scroll: u16,
    pub max_scroll: u16,
    pub chat_height: u16, // Inner height of the transcript, for page scrolling
    seen_turns: usize,
    seen_pending: bool,

    // Panel area for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

impl App {
    pub fn new(client: ChatClient) -> Self {
        Self {
            should_quit: false,
            conversation: Conversation::new(),
            client,
            send_task: None,
            input: String::new(),
            cursor: 0,
            scroll: 0,
            max_scroll: 0,
            chat_height: 0,
            seen_turns: 0,
            seen_pending: false,
            chat_area: None,
            animation_frame: 0,
        }
    }

    /// The input box is disabled while a reply is outstanding
    pub fn input_enabled(&self) -> bool {
        !self.conversation.is_pending()
    }

    /// Hand the typed text to the controller and spawn the request
    pub fn submit_input(&mut self) {
        let Some(message) = self.conversation.submit(&self.input) else {
            return;
        };

        self.input.clear();
        self.cursor = 0;
        self.animation_frame = 0;

        let client = self.client.clone();
        self.send_task = Some(tokio::spawn(async move { client.chat(&message).await }));
    }

    /// Feed a finished request back into the conversation
    pub async fn poll_send_task(&mut self) {
        let finished = self
            .send_task
            .as_ref()
            .is_some_and(|handle| handle.is_finished());
        if !finished {
            return;
        }
        let Some(handle) = self.send_task.take() else {
            return;
        };

        match handle.await {
            Ok(Ok(reply)) => self.conversation.on_resolved(reply),
            Ok(Err(err)) => self.conversation.on_failed(&err),
            Err(join_err) => self
                .conversation
                .on_failed(&SendError::Other(join_err.to_string())),
        }
    }

    pub fn tick_animation(&mut self) {
        if self.conversation.is_pending() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Record the transcript size after layout. Jumps to the newest entry
    /// whenever the turns (or the pending placeholder) changed since last frame.
    pub fn update_scroll_bounds(&mut self, total_lines: u16, visible_height: u16) {
        self.chat_height = visible_height;
        self.max_scroll = total_lines.saturating_sub(visible_height);

        let state = self.conversation.state();
        let turns = state.turns.len();
        let pending = state.pending;
        if turns != self.seen_turns || pending != self.seen_pending {
            self.seen_turns = turns;
            self.seen_pending = pending;
            self.scroll = self.max_scroll;
        }

        self.scroll = self.scroll.min(self.max_scroll);
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_add(lines).min(self.max_scroll);
    }

    pub fn scroll_half_page_up(&mut self) {
        self.scroll_up((self.chat_height / 2).max(1));
    }

    pub fn scroll_half_page_down(&mut self) {
        self.scroll_down((self.chat_height / 2).max(1));
    }

    // Input editing
    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.input, self.cursor);
        self.input.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.input.chars().count() {
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.input.chars().count());
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.input.chars().count();
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn app() -> App {
        App::new(ChatClient::new("http://127.0.0.1:9"))
    }

    #[test]
    fn test_char_to_byte_index_multibyte() {
        assert_eq!(char_to_byte_index("héllo", 2), 3);
        assert_eq!(char_to_byte_index("héllo", 10), 6);
    }

    #[test]
    fn test_editing_is_utf8_safe() {
        let mut app = app();
        for c in "añb".chars() {
            app.insert_char(c);
        }
        app.cursor_left();
        app.backspace();
        assert_eq!(app.input, "ab");
        assert_eq!(app.cursor, 1);

        app.cursor_home();
        app.delete();
        assert_eq!(app.input, "b");

        app.cursor_end();
        app.cursor_right();
        assert_eq!(app.cursor, 1);
    }

    #[test]
    fn test_blank_input_is_not_sent() {
        let mut app = app();
        app.input = "   ".to_string();
        app.submit_input();
        assert!(app.send_task.is_none());
        assert!(app.conversation.state().turns.is_empty());
        assert_eq!(app.input, "   ");
    }

    #[test]
    fn test_scroll_follows_new_turns() {
        let mut app = app();
        app.update_scroll_bounds(10, 20);
        assert_eq!(app.scroll, 0);

        app.conversation.submit("hello");
        app.update_scroll_bounds(50, 20);
        assert_eq!(app.scroll, 30);

        // Manual scrolling sticks until the transcript changes again
        app.scroll_up(10);
        app.update_scroll_bounds(50, 20);
        assert_eq!(app.scroll, 20);

        app.conversation.on_failed(&SendError::Other("down".to_string()));
        app.update_scroll_bounds(60, 20);
        assert_eq!(app.scroll, 40);
    }

    #[test]
    fn test_scroll_is_clamped() {
        let mut app = app();
        app.update_scroll_bounds(30, 20);
        app.scroll_down(100);
        assert_eq!(app.scroll, 10);
        app.scroll_up(100);
        assert_eq!(app.scroll, 0);
    }

    #[tokio::test]
    async fn test_failed_send_becomes_error_turn() {
        let mut app = app();
        app.input = "hello".to_string();
        app.submit_input();

        assert!(app.input.is_empty());
        assert!(!app.input_enabled());

        let wait = async {
            while app.send_task.as_ref().is_some_and(|h| !h.is_finished()) {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        };
        tokio::time::timeout(Duration::from_secs(10), wait).await.unwrap();
        app.poll_send_task().await;

        let state = app.conversation.state();
        assert_eq!(state.turns.len(), 2);
        assert!(state.last_error.is_some());
        assert!(app.input_enabled());
    }
}
