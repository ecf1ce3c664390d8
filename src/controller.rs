//! The chat widget controller.
//!
//! Owns the ordered message list, the input line, the send affordance and the
//! status label. It never touches the network or the terminal: a submission
//! hands back the prompt to send, and the caller feeds the eventual
//! [`RequestOutcome`] into [`ChatController::resolve_response`].

use crate::message::{Message, Strings};

/// How an issued request ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    Success(String),
    Failure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Sending,
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Single-line text input with a character-based cursor
#[derive(Debug, Clone, Default)]
pub struct InputLine {
    text: String,
    cursor: usize,
}

impl InputLine {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn insert(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.text, self.cursor);
        self.text.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn insert_str(&mut self, s: &str) {
        // Pasted newlines would otherwise end up inside a single-line prompt
        for c in s.chars().map(|c| if c == '\n' || c == '\r' { ' ' } else { c }) {
            self.insert(c);
        }
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.text.chars().count() {
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.chars().count();
    }
}

pub struct ChatController {
    messages: Vec<Message>,
    // Index of the typing placeholder while a request is outstanding
    placeholder: Option<usize>,
    pub input: InputLine,
    send_enabled: bool,
    input_focused: bool,
    status_label: String,
    strings: Strings,
}

impl ChatController {
    pub fn new(strings: Strings) -> Self {
        Self {
            messages: Vec::new(),
            placeholder: None,
            input: InputLine::default(),
            send_enabled: true,
            input_focused: true,
            status_label: strings.status_idle.to_string(),
            strings,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn placeholder_index(&self) -> Option<usize> {
        self.placeholder
    }

    pub fn strings(&self) -> &Strings {
        &self.strings
    }

    pub fn send_enabled(&self) -> bool {
        self.send_enabled
    }

    pub fn status_label(&self) -> &str {
        &self.status_label
    }

    pub fn input_focused(&self) -> bool {
        self.input_focused
    }

    pub fn set_input_focused(&mut self, focused: bool) {
        self.input_focused = focused;
    }

    pub fn phase(&self) -> Phase {
        if self.send_enabled {
            Phase::Idle
        } else {
            Phase::Sending
        }
    }

    /// Submit `text` as a prompt.
    ///
    /// Returns the trimmed prompt that must be sent to the backend, or `None`
    /// when nothing should be sent: blank input, or a request already in
    /// flight. Neither case is an error and neither touches the conversation.
    pub fn submit_prompt(&mut self, text: &str) -> Option<String> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if !self.send_enabled {
            tracing::debug!("submission ignored while a request is outstanding");
            return None;
        }

        self.messages.push(Message::user(text));
        self.input.clear();

        self.send_enabled = false;
        self.status_label = self.strings.status_working.to_string();

        self.placeholder = Some(self.messages.len());
        self.messages.push(Message::bot(self.strings.typing));

        tracing::debug!(messages = self.messages.len(), "prompt submitted");
        Some(text.to_string())
    }

    /// Submit whatever is currently in the input line
    pub fn submit_input(&mut self) -> Option<String> {
        let text = self.input.text().to_string();
        self.submit_prompt(&text)
    }

    /// Apply the outcome of the outstanding request.
    ///
    /// The placeholder is removed and the UI returns to idle on every path.
    pub fn resolve_response(&mut self, outcome: RequestOutcome) {
        if let Some(idx) = self.placeholder.take() {
            if idx < self.messages.len() {
                self.messages.remove(idx);
            }
        }

        let text = match outcome {
            RequestOutcome::Success(text) if text.is_empty() => self.strings.no_response.to_string(),
            RequestOutcome::Success(text) => text,
            RequestOutcome::Failure => self.strings.unreachable.to_string(),
        };
        self.messages.push(Message::bot(text));

        self.send_enabled = true;
        self.status_label = self.strings.status_idle.to_string();
        self.input_focused = true;

        tracing::debug!(messages = self.messages.len(), "request resolved");
    }

    /// Drop every message and greet again. Frontend only: an outstanding
    /// request still resolves and its reply lands after the greeting.
    pub fn clear_conversation(&mut self) {
        self.messages.clear();
        self.placeholder = None;
        self.messages.push(Message::bot(self.strings.greeting));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;

    fn controller() -> ChatController {
        ChatController::new(Strings::portuguese())
    }

    #[test]
    fn test_blank_input_is_ignored() {
        let mut chat = controller();
        for text in ["", " ", "\t\n", "   \r\n  "] {
            assert_eq!(chat.submit_prompt(text), None);
        }
        assert!(chat.messages().is_empty());
        assert_eq!(chat.phase(), Phase::Idle);
        assert_eq!(chat.status_label(), "Online");
    }

    #[test]
    fn test_blank_input_keeps_input_line() {
        let mut chat = controller();
        chat.input.insert_str("   ");
        assert_eq!(chat.submit_input(), None);
        assert_eq!(chat.input.text(), "   ");
    }

    #[test]
    fn test_submit_appends_user_message_and_placeholder() {
        let mut chat = controller();
        chat.input.insert_str("  olá  ");

        let prompt = chat.submit_input();

        assert_eq!(prompt.as_deref(), Some("olá"));
        assert_eq!(
            chat.messages(),
            &[Message::user("olá"), Message::bot("Digitando...")]
        );
        assert_eq!(chat.placeholder_index(), Some(1));
        assert_eq!(chat.input.text(), "");
        assert_eq!(chat.input.cursor(), 0);
        assert!(!chat.send_enabled());
        assert_eq!(chat.phase(), Phase::Sending);
        assert_eq!(chat.status_label(), "Pensando...");
    }

    #[test]
    fn test_submit_while_sending_is_prevented() {
        let mut chat = controller();
        chat.submit_prompt("first");
        chat.input.insert_str("second");

        assert_eq!(chat.submit_input(), None);
        assert_eq!(chat.messages().len(), 2);
        assert_eq!(chat.input.text(), "second");
    }

    #[test]
    fn test_success_replaces_placeholder() {
        let mut chat = controller();
        chat.submit_prompt("hi");
        chat.resolve_response(RequestOutcome::Success("hello".to_string()));

        assert_eq!(chat.messages(), &[Message::user("hi"), Message::bot("hello")]);
        assert_eq!(chat.placeholder_index(), None);
    }

    #[test]
    fn test_empty_reply_uses_no_response_text() {
        let mut chat = controller();
        chat.submit_prompt("hi");
        chat.resolve_response(RequestOutcome::Success(String::new()));

        assert_eq!(chat.messages().last().unwrap().text, "(sem resposta)");
    }

    #[test]
    fn test_failure_appends_single_error_message() {
        let mut chat = controller();
        chat.submit_prompt("hi");
        chat.resolve_response(RequestOutcome::Failure);

        let bot_messages: Vec<_> = chat
            .messages()
            .iter()
            .filter(|m| m.role == Role::Bot)
            .collect();
        assert_eq!(bot_messages.len(), 1);
        assert_eq!(
            bot_messages[0].text,
            "Erro: não consegui acessar o servidor. Veja o terminal do Flask."
        );
        assert!(chat.send_enabled());
        assert_eq!(chat.status_label(), "Online");
    }

    #[test]
    fn test_resolution_restores_idle_and_focus() {
        for outcome in [
            RequestOutcome::Success("ok".to_string()),
            RequestOutcome::Success(String::new()),
            RequestOutcome::Failure,
        ] {
            let mut chat = controller();
            chat.submit_prompt("hi");
            chat.set_input_focused(false);
            chat.resolve_response(outcome);

            assert!(chat.send_enabled());
            assert!(chat.input_focused());
            assert_eq!(chat.phase(), Phase::Idle);
            assert_eq!(chat.status_label(), "Online");
        }
    }

    #[test]
    fn test_each_submission_yields_one_user_and_one_bot_message() {
        let mut chat = controller();
        for i in 0..3 {
            chat.submit_prompt(&format!("q{}", i));
            chat.resolve_response(RequestOutcome::Success(format!("a{}", i)));
        }

        let roles: Vec<Role> = chat.messages().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::User, Role::Bot, Role::User, Role::Bot, Role::User, Role::Bot]
        );
        assert_eq!(chat.messages()[5].text, "a2");
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut chat = controller();
        chat.submit_prompt("hi");
        chat.resolve_response(RequestOutcome::Success("hello".to_string()));

        chat.clear_conversation();
        let once = chat.messages().to_vec();
        chat.clear_conversation();

        assert_eq!(once, vec![Message::bot("Conversa limpa. Como posso te ajudar?")]);
        assert_eq!(chat.messages(), once.as_slice());
    }

    #[test]
    fn test_clear_during_request_drops_placeholder() {
        let mut chat = controller();
        chat.submit_prompt("hi");
        chat.clear_conversation();

        assert_eq!(chat.placeholder_index(), None);
        assert!(!chat.send_enabled());

        chat.resolve_response(RequestOutcome::Success("late".to_string()));
        assert_eq!(
            chat.messages(),
            &[
                Message::bot("Conversa limpa. Como posso te ajudar?"),
                Message::bot("late"),
            ]
        );
        assert!(chat.send_enabled());
    }

    #[test]
    fn test_english_strings() {
        let mut chat = ChatController::new(Strings::english());
        chat.submit_prompt("hi");
        assert_eq!(chat.messages()[1].text, "Typing...");
        assert_eq!(chat.status_label(), "Thinking...");
        chat.resolve_response(RequestOutcome::Success(String::new()));
        assert_eq!(chat.messages()[1].text, "(no response)");
    }

    #[test]
    fn test_input_line_editing_is_utf8_safe() {
        let mut input = InputLine::default();
        input.insert_str("ação");
        input.move_left();
        input.backspace();
        assert_eq!(input.text(), "aço");
        assert_eq!(input.cursor(), 2);

        input.move_home();
        input.delete();
        assert_eq!(input.text(), "ço");

        input.move_end();
        input.insert('!');
        assert_eq!(input.text(), "ço!");

        input.move_right();
        assert_eq!(input.cursor(), 3);
    }

    #[test]
    fn test_paste_flattens_newlines() {
        let mut input = InputLine::default();
        input.insert_str("one\ntwo\r\n");
        assert_eq!(input.text(), "one two  ");
    }
}
