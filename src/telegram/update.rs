//! Inbound webhook envelope types.
//!
//! The raw JSON body is parsed into a tagged [`Event`] right at the boundary;
//! everything downstream works on the typed variant. Anything that does not
//! match one of the two recognized shapes — including bodies that are not
//! JSON at all — becomes [`Event::Unknown`], which the dispatcher ignores.

use serde::Deserialize;

/// Raw update envelope as delivered by the platform.
#[derive(Debug, Deserialize)]
pub struct Update {
    pub message: Option<IncomingMessage>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// Sender info attached to a message.
#[derive(Debug, Clone, Deserialize)]
pub struct Sender {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub language_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub chat: Chat,
    pub text: Option<String>,
    pub from: Option<Sender>,
}

/// A button click from a previously sent inline keyboard.
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub data: Option<String>,
    /// The message the keyboard was attached to; carries the chat id.
    pub message: Option<CallbackMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackMessage {
    pub chat: Chat,
}

/// Inbound event, one per webhook delivery. Each event is independent; there
/// is no cross-event session state beyond the subscriber store.
#[derive(Debug)]
pub enum Event {
    Message(IncomingMessage),
    Callback(CallbackQuery),
    Unknown,
}

impl Event {
    /// Parses a webhook body. Message envelopes take priority over callback
    /// envelopes; malformed bodies are `Unknown`, never an error.
    pub fn parse(body: &[u8]) -> Event {
        let update: Update = match serde_json::from_slice(body) {
            Ok(update) => update,
            Err(err) => {
                log::debug!("Ignoring unparseable update: {err}");
                return Event::Unknown;
            }
        };

        if let Some(message) = update.message {
            Event::Message(message)
        } else if let Some(callback) = update.callback_query {
            Event::Callback(callback)
        } else {
            Event::Unknown
        }
    }
}
