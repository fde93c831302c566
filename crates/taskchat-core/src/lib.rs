pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod markup;
pub mod state;

// Re-export main types for convenience
pub use client::{ChatAction, ChatBackend, ChatClient, ChatMetadata, ChatReply};
pub use config::Config;
pub use controller::Conversation;
pub use error::SendError;
pub use markup::{FormattedLine, Inline};
pub use state::{ChatRole, ChatTurn, ConversationState};
