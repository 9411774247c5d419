//! Inbound event routing.
//!
//! One webhook delivery is handled end-to-end here: command texts, free-text
//! league replies and keyboard callbacks. Storage failures are logged at this
//! boundary and never escape to the HTTP response — the platform always sees
//! a success acknowledgment, or it would retry the delivery.

use std::sync::Arc;

use fluent_templates::fluent_bundle::FluentArgs;

use crate::core::config::Config;
use crate::core::error::AppResult;
use crate::i18n;
use crate::storage::db::{get_connection, DbPool};
use crate::storage::subscribers::{self, Frequency, SubscriberPatch};
use crate::telegram::gateway::TelegramGateway;
use crate::telegram::keyboard::{self, CallbackAction, InlineKeyboard};
use crate::telegram::update::{CallbackQuery, Event, IncomingMessage};

/// Maximum length of the /start attribution argument.
const MAX_SOURCE_CHARS: usize = 64;
/// Maximum stored length of a free-text league reply.
const MAX_LEAGUES_CHARS: usize = 100;

/// Everything the handlers need, passed explicitly (no ambient globals).
#[derive(Clone)]
pub struct HandlerDeps {
    pub db: Arc<DbPool>,
    pub gateway: TelegramGateway,
    pub config: Arc<Config>,
}

impl HandlerDeps {
    /// Fire-and-forget send: a delivery failure is logged, not retried, and
    /// never fails the inbound webhook response.
    async fn send_best_effort(&self, chat_id: i64, text: &str, keyboard: Option<&InlineKeyboard>) {
        if let Err(err) = self.gateway.send_message(chat_id, text, keyboard).await {
            log::warn!("Failed to deliver message to chat {chat_id}: {err}");
        }
    }
}

/// Routes one inbound event. Never fails: errors are logged and swallowed so
/// a single malformed or unlucky event cannot crash the request path.
pub async fn dispatch(event: Event, deps: &HandlerDeps) {
    let result = match event {
        Event::Message(msg) => handle_message(msg, deps).await,
        Event::Callback(cb) => handle_callback(cb, deps).await,
        Event::Unknown => Ok(()),
    };

    if let Err(err) = result {
        log::error!("Failed to handle update: {err}");
    }
}

async fn handle_message(msg: IncomingMessage, deps: &HandlerDeps) -> AppResult<()> {
    let chat_id = msg.chat.id;
    let text = msg.text.as_deref().unwrap_or("");

    // Locale comes from the sender's declared language tag; the stored
    // record is only consulted for callbacks.
    let locale = msg
        .from
        .as_ref()
        .and_then(|from| from.language_code.as_deref())
        .filter(|code| !code.is_empty())
        .unwrap_or(&deps.config.default_locale)
        .to_string();
    let lang = i18n::lang_from_locale(&locale);

    if text.starts_with("/start") {
        let from = msg.from.as_ref();
        let patch = SubscriberPatch {
            username: Some(from.and_then(|f| f.username.clone())),
            first_name: Some(from.and_then(|f| f.first_name.clone())),
            locale: Some(locale),
            consent: Some(true),
            source: Some(start_source(text)),
            ..Default::default()
        };

        let conn = get_connection(&deps.db)?;
        subscribers::upsert(&conn, chat_id, &patch)?;

        let keyboard = keyboard::welcome_keyboard(&lang);
        deps.send_best_effort(chat_id, &i18n::t(&lang, "welcome"), Some(&keyboard))
            .await;
        return Ok(());
    }

    if text.starts_with("/stop") {
        let conn = get_connection(&deps.db)?;
        subscribers::delete(&conn, chat_id)?;

        deps.send_best_effort(chat_id, &i18n::t(&lang, "stopped"), None).await;
        return Ok(());
    }

    if !text.is_empty() {
        // Any other text is taken as a league preference reply. There is no
        // session state tracking whether we just asked for leagues.
        let conn = get_connection(&deps.db)?;
        subscribers::set_leagues(&conn, chat_id, truncate_chars(text, MAX_LEAGUES_CHARS))?;

        let mut args = FluentArgs::new();
        args.set("leagues", text);
        deps.send_best_effort(chat_id, &i18n::t_args(&lang, "leagues_saved", &args), None)
            .await;
    }

    Ok(())
}

async fn handle_callback(cb: CallbackQuery, deps: &HandlerDeps) -> AppResult<()> {
    let outcome = match cb.message.as_ref().map(|message| message.chat.id) {
        Some(chat_id) => run_callback_action(chat_id, cb.data.as_deref().unwrap_or(""), deps).await,
        None => {
            log::warn!("Callback {} carries no message envelope, skipping", cb.id);
            Ok(())
        }
    };

    // Acknowledge exactly once, last, whatever the branch did.
    if let Err(err) = deps.gateway.answer_callback_query(&cb.id).await {
        log::warn!("Failed to acknowledge callback {}: {err}", cb.id);
    }

    outcome
}

async fn run_callback_action(chat_id: i64, data: &str, deps: &HandlerDeps) -> AppResult<()> {
    let conn = get_connection(&deps.db)?;

    // Stored locale wins; a stale callback after unsubscribe gets the default.
    let locale = subscribers::get(&conn, chat_id)?
        .and_then(|sub| sub.locale)
        .filter(|locale| !locale.is_empty())
        .unwrap_or_else(|| deps.config.default_locale.clone());
    let lang = i18n::lang_from_locale(&locale);

    match keyboard::parse_callback_data(data) {
        Some(CallbackAction::PrefStop) => {
            subscribers::delete(&conn, chat_id)?;
            deps.send_best_effort(chat_id, &i18n::t(&lang, "stopped"), None).await;
        }
        Some(CallbackAction::PrefLess) => {
            subscribers::set_frequency(&conn, chat_id, Frequency::Low)?;
            deps.send_best_effort(chat_id, &i18n::t(&lang, "set_low"), None).await;
        }
        Some(CallbackAction::PrefLeagues) => {
            // No persistence change; the next free-text message is the reply.
            deps.send_best_effort(chat_id, &i18n::t(&lang, "reply_league"), None).await;
        }
        None => {
            log::debug!("Ignoring unrecognized callback data {data:?} from chat {chat_id}");
        }
    }

    Ok(())
}

/// Extracts the optional /start argument: everything after the first
/// whitespace, trimmed and truncated to [`MAX_SOURCE_CHARS`]. Empty when the
/// command has no argument.
fn start_source(text: &str) -> String {
    text.split_once(char::is_whitespace)
        .map(|(_, rest)| truncate_chars(rest.trim(), MAX_SOURCE_CHARS).to_string())
        .unwrap_or_default()
}

/// Truncates on a char boundary, never mid-codepoint.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn start_source_takes_the_remainder_after_the_command() {
        assert_eq!(start_source("/start promoA"), "promoA");
        assert_eq!(start_source("/start  promo A  "), "promo A");
        assert_eq!(start_source("/start"), "");
    }

    #[test]
    fn start_source_is_truncated_to_64_chars() {
        let long = format!("/start {}", "a".repeat(100));
        assert_eq!(start_source(&long).len(), 64);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("中超联赛", 2), "中超");
        assert_eq!(truncate_chars("EPL", 100), "EPL");
        assert_eq!(truncate_chars("", 5), "");
    }
}
