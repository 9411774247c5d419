//! Outbound Telegram Bot API gateway.
//!
//! A thin wrapper over the HTTP API: send a chat message, acknowledge a
//! callback, register/deregister the webhook. No retries anywhere — delivery
//! failures are the caller's to log and swallow.

use reqwest::Client;
use serde_json::{json, Value};

use crate::core::config::{self, Config};
use crate::core::error::AppResult;
use crate::telegram::keyboard::InlineKeyboard;

#[derive(Debug, Clone)]
pub struct TelegramGateway {
    http: Client,
    /// `{api_root}/bot{token}`, method name appended per call.
    base_url: String,
}

impl TelegramGateway {
    /// Builds the gateway from the startup configuration.
    ///
    /// # Errors
    /// Returns `AppError::Gateway` if the HTTP client cannot be constructed.
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = Client::builder().timeout(config::gateway_timeout()).build()?;
        Ok(TelegramGateway {
            http,
            base_url: format!("{}/bot{}", config.api_root.trim_end_matches('/'), config.bot_token),
        })
    }

    /// Issues one Bot API call and returns the platform's raw JSON response.
    async fn call(&self, method: &str, payload: &Value) -> AppResult<Value> {
        let response = self
            .http
            .post(format!("{}/{}", self.base_url, method))
            .json(payload)
            .send()
            .await?;
        let body = response.json::<Value>().await?;
        Ok(body)
    }

    /// Sends a chat message. Formatting mode and link-preview suppression are
    /// fixed, not per-call options.
    pub async fn send_message(&self, chat_id: i64, text: &str, keyboard: Option<&InlineKeyboard>) -> AppResult<Value> {
        let mut payload = json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "HTML",
            "disable_web_page_preview": true,
        });
        if let Some(keyboard) = keyboard {
            payload["reply_markup"] = json!({ "inline_keyboard": keyboard });
        }
        self.call("sendMessage", &payload).await
    }

    /// Acknowledges a callback query (distinct from sending a chat message).
    pub async fn answer_callback_query(&self, callback_id: &str) -> AppResult<Value> {
        self.call("answerCallbackQuery", &json!({ "callback_query_id": callback_id }))
            .await
    }

    /// Registers `url` as the webhook endpoint with the platform.
    pub async fn set_webhook(&self, url: &str) -> AppResult<Value> {
        self.call("setWebhook", &json!({ "url": url })).await
    }

    /// Deregisters the webhook.
    pub async fn delete_webhook(&self) -> AppResult<Value> {
        self.call("deleteWebhook", &json!({})).await
    }
}
