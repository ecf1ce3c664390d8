//! Chat data model and the fixed user-visible strings.
//!
//! Nothing here depends on the terminal; the controller and the renderer both
//! build on these types.

use serde::{Deserialize, Serialize};

/// A chat message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
}

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Bot,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            role: Role::Bot,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    PtBr,
    En,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::PtBr => "pt-BR",
            Locale::En => "en",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "pt-br" | "pt" => Some(Locale::PtBr),
            "en" | "en-us" | "en-gb" => Some(Locale::En),
            _ => None,
        }
    }

    pub fn strings(&self) -> Strings {
        match self {
            Locale::PtBr => Strings::portuguese(),
            Locale::En => Strings::english(),
        }
    }
}

/// Every fixed string the chat widget shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Strings {
    pub user_label: &'static str,
    pub bot_label: &'static str,
    pub typing: &'static str,
    pub no_response: &'static str,
    pub unreachable: &'static str,
    pub greeting: &'static str,
    pub status_working: &'static str,
    pub status_idle: &'static str,
    pub input_title: &'static str,
    pub empty_hint: &'static str,
}

impl Strings {
    pub fn portuguese() -> Self {
        Self {
            user_label: "Você",
            bot_label: "Bot",
            typing: "Digitando...",
            no_response: "(sem resposta)",
            unreachable: "Erro: não consegui acessar o servidor. Veja o terminal do Flask.",
            greeting: "Conversa limpa. Como posso te ajudar?",
            status_working: "Pensando...",
            status_idle: "Online",
            input_title: "Mensagem",
            empty_hint: "Digite sua mensagem e pressione Enter.",
        }
    }

    pub fn english() -> Self {
        Self {
            user_label: "You",
            bot_label: "Bot",
            typing: "Typing...",
            no_response: "(no response)",
            unreachable: "Error: could not reach the server. Check the backend terminal.",
            greeting: "Conversation cleared. How can I help you?",
            status_working: "Thinking...",
            status_idle: "Online",
            input_title: "Message",
            empty_hint: "Type your message and press Enter.",
        }
    }

    pub fn label(&self, role: Role) -> &'static str {
        match role {
            Role::User => self.user_label,
            Role::Bot => self.bot_label,
        }
    }
}

impl Default for Strings {
    fn default() -> Self {
        Locale::default().strings()
    }
}
