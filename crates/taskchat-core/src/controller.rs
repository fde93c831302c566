//! Conversation controller
//!
//! Owns the transcript and the request lifecycle. Every change goes through
//! [`Conversation::submit`], [`Conversation::on_resolved`] or
//! [`Conversation::on_failed`]; renderers only ever see a `&ConversationState`.
//!
//! Only one request may be outstanding at a time. A submit while a reply is
//! pending is rejected, so replies can never be appended out of order.

use crate::client::{ChatBackend, ChatReply};
use crate::error::SendError;
use crate::state::{ChatTurn, ConversationState};

#[derive(Debug, Default)]
pub struct Conversation {
    state: ConversationState,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state.pending
    }

    /// Start a request for `text`.
    ///
    /// Returns the message to hand to the backend, or `None` when the text is
    /// blank or another request is still pending. The user turn keeps the text
    /// exactly as typed.
    pub fn submit(&mut self, text: &str) -> Option<String> {
        if text.trim().is_empty() {
            return None;
        }
        if self.state.pending {
            tracing::warn!("submit ignored: a reply is still pending");
            return None;
        }

        self.state.turns.push(ChatTurn::user(text));
        self.state.pending = true;
        self.state.last_error = None;
        tracing::debug!(turns = self.state.turns.len(), "user message submitted");

        Some(text.to_string())
    }

    pub fn on_resolved(&mut self, reply: ChatReply) {
        if !self.state.pending {
            tracing::warn!("reply arrived with no pending request; dropping it");
            return;
        }

        if let Some(metadata) = &reply.metadata {
            tracing::debug!(
                action = ?metadata.action,
                task_id = ?metadata.task_id,
                count = ?metadata.count,
                "reply metadata"
            );
        }

        self.state.turns.push(ChatTurn::assistant(reply.message));
        self.state.pending = false;
    }

    pub fn on_failed(&mut self, err: &SendError) {
        if !self.state.pending {
            tracing::warn!(error = %err, "failure arrived with no pending request; dropping it");
            return;
        }

        let description = err.description();
        tracing::error!(error = %description, "chat request failed");

        self.state.turns.push(ChatTurn::assistant(format!(
            "Sorry, I encountered an error: {}. Please try again.",
            description
        )));
        self.state.last_error = Some(description);
        self.state.pending = false;
    }

    /// Hide the error banner. The transcript keeps its error turn.
    pub fn dismiss_error(&mut self) {
        self.state.last_error = None;
    }

    /// Run one full round trip against `backend`.
    ///
    /// Returns `false` if the text was not submitted.
    pub async fn exchange<B: ChatBackend>(&mut self, backend: &B, text: &str) -> bool {
        let Some(message) = self.submit(text) else {
            return false;
        };

        match backend.send(&message).await {
            Ok(reply) => self.on_resolved(reply),
            Err(err) => self.on_failed(&err),
        }
        true
    }
}
