//! Chat with the home assistant.
//!
//! A send records the user's message, pauses for a short "typing" delay,
//! runs the interpreter and records the reply. Replies to commands also
//! become the home's last notification.

use std::time::Duration;

use tracing::info;

use crate::interpret::{Interpretation, Interpreter};
use crate::model::Sender;
use crate::store::HomeStore;

/// The assistant side of the chat.
#[derive(Debug, Clone)]
pub struct Assistant {
    interpreter: Interpreter,
    typing_delay: Duration,
}

impl Assistant {
    pub fn new(interpreter: Interpreter, typing_delay: Duration) -> Self {
        Self {
            interpreter,
            typing_delay,
        }
    }

    /// Sends one message and waits for the assistant's reply.
    ///
    /// Blank messages are ignored and return `None`.
    pub async fn send(&self, store: &mut HomeStore, text: &str) -> Option<Interpretation> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        store.append_chat_message(Sender::User, text);
        tokio::time::sleep(self.typing_delay).await;

        let interpretation = self.interpreter.interpret(text, store);
        store.append_chat_message(Sender::Assistant, &interpretation.reply);
        if interpretation.is_specific() {
            info!(command = ?interpretation.command, "chat command applied");
            store.set_last_notification(&interpretation.reply);
        }

        Some(interpretation)
    }
}
