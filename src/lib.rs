//! Matchpulse — webhook-driven Telegram bot for localized football
//! pre-match notifications.
//!
//! The bot receives platform updates over an HTTP webhook, keeps per-chat
//! subscriber preferences in SQLite, and answers with templated messages in
//! Vietnamese or Chinese.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging and the web server
//! - `storage`: the subscriber store on SQLite
//! - `telegram`: inbound envelopes, event routing, outbound gateway
//! - `i18n`: locale-keyed message templates

pub mod core;
pub mod i18n;
pub mod storage;
pub mod telegram;

// Re-export commonly used types for convenience
pub use crate::core::{AppError, AppResult, Config};
pub use crate::storage::{create_pool, get_connection, DbConnection, DbPool};
pub use crate::telegram::{dispatch, HandlerDeps, TelegramGateway};
