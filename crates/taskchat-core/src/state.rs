//! UI-agnostic conversation state types
//!
//! These structures are shared by every front end and don't depend on any
//! specific UI framework.

/// A single message in the conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// The role of a message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn display_name(&self) -> &'static str {
        match self {
            ChatRole::User => "You",
            ChatRole::Assistant => "AI Assistant",
        }
    }
}

/// Everything a renderer needs to draw the transcript
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    pub turns: Vec<ChatTurn>,
    pub pending: bool,
    pub last_error: Option<String>,
}
