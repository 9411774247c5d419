//! Telegram integration: inbound envelopes, event routing and the outbound
//! Bot API gateway.

pub mod dispatcher;
pub mod gateway;
pub mod keyboard;
pub mod update;

pub use dispatcher::{dispatch, HandlerDeps};
pub use gateway::TelegramGateway;
pub use keyboard::{welcome_keyboard, CallbackAction, InlineKeyboard};
pub use update::Event;
