//! Minimal Telegram Bot API client (long polling)

use super::keyboard::InlineKeyboard;
use crate::config::TelegramConfig;
use crate::error::{BotError, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
    #[serde(default)]
    pub photo: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub voice: Option<serde_json::Value>,
}

impl Message {
    /// Text, photo or voice: the kinds that trigger the first-contact welcome
    pub fn is_greetable(&self) -> bool {
        self.text.is_some() || self.photo.is_some() || self.voice.is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    pub message: Option<Message>,
    pub data: Option<String>,
}

/// Every Bot API answer is wrapped in this envelope
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<&'a InlineKeyboard>,
}

#[derive(Debug, Serialize)]
struct AnswerCallbackRequest<'a> {
    callback_query_id: &'a str,
}

#[derive(Clone)]
pub struct TelegramApi {
    http: Client,
    base_url: String,
}

impl TelegramApi {
    pub fn new(config: &TelegramConfig, bot_token: &str) -> Result<Self> {
        // must outlive the long-polling timeout
        let http = Client::builder()
            .timeout(Duration::from_secs(config.poll_timeout_secs + 10))
            .build()?;

        Ok(Self {
            http,
            base_url: format!("{}/bot{}", config.api_url.trim_end_matches('/'), bot_token),
        })
    }

    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>> {
        let url = format!("{}/getUpdates", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("offset", offset.to_string()),
                ("timeout", timeout_secs.to_string()),
            ])
            .send()
            .await
            .map_err(strip_url)?;

        Self::unwrap_result(resp.json().await.map_err(strip_url)?)
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<()> {
        let request = SendMessageRequest {
            chat_id,
            text,
            parse_mode: "HTML",
            reply_markup: keyboard,
        };
        self.post::<_, serde_json::Value>("sendMessage", &request)
            .await?;
        Ok(())
    }

    /// Stops the loading spinner on the pressed button
    pub async fn answer_callback_query(&self, callback_query_id: &str) -> Result<()> {
        let request = AnswerCallbackRequest { callback_query_id };
        self.post::<_, bool>("answerCallbackQuery", &request).await?;
        Ok(())
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<T> {
        let url = format!("{}/{}", self.base_url, method);
        let resp = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(strip_url)?;
        Self::unwrap_result(resp.json().await.map_err(strip_url)?)
    }

    fn unwrap_result<T>(response: ApiResponse<T>) -> Result<T> {
        match response {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse { description, .. } => Err(BotError::Telegram(
                description.unwrap_or_else(|| "empty response".to_string()),
            )),
        }
    }
}

/// Request URLs carry the bot token; keep them out of errors and logs
fn strip_url(e: reqwest::Error) -> BotError {
    BotError::Http(e.without_url())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_updates() {
        let json = r#"{"ok": true, "result": [
            {"update_id": 10, "message": {"message_id": 1,
                "from": {"id": 42, "is_bot": false, "first_name": "Léa"},
                "chat": {"id": 42, "type": "private"}, "date": 0, "text": "/start"}},
            {"update_id": 11, "message": {"message_id": 2,
                "from": {"id": 43, "is_bot": false, "first_name": "Tom"},
                "chat": {"id": 43, "type": "private"}, "date": 0,
                "photo": [{"file_id": "abc", "width": 90, "height": 90}]}},
            {"update_id": 12, "callback_query": {"id": "cb1",
                "from": {"id": 42, "is_bot": false, "first_name": "Léa"},
                "message": {"message_id": 3, "chat": {"id": 42, "type": "private"}, "date": 0},
                "chat_instance": "x", "data": "generate_safe"}},
            {"update_id": 13, "message": {"message_id": 4,
                "chat": {"id": 44, "type": "private"}, "date": 0,
                "sticker": {"file_id": "s"}}}
        ]}"#;

        let response: ApiResponse<Vec<Update>> = serde_json::from_str(json).unwrap();
        let updates = TelegramApi::unwrap_result(response).unwrap();
        assert_eq!(updates.len(), 4);

        let first = updates[0].message.as_ref().unwrap();
        assert_eq!(first.text.as_deref(), Some("/start"));
        assert_eq!(first.from.as_ref().unwrap().first_name, "Léa");
        assert!(first.is_greetable());

        assert!(updates[1].message.as_ref().unwrap().is_greetable());

        let callback = updates[2].callback_query.as_ref().unwrap();
        assert_eq!(callback.data.as_deref(), Some("generate_safe"));
        assert_eq!(callback.message.as_ref().unwrap().chat.id, 42);

        assert!(!updates[3].message.as_ref().unwrap().is_greetable());
    }

    #[test]
    fn test_error_response() {
        let json = r#"{"ok": false, "error_code": 401, "description": "Unauthorized"}"#;
        let response: ApiResponse<Vec<Update>> = serde_json::from_str(json).unwrap();
        match TelegramApi::unwrap_result(response) {
            Err(BotError::Telegram(msg)) => assert_eq!(msg, "Unauthorized"),
            other => panic!("unexpected: {:?}", other.map(|u| u.len())),
        }
    }

    #[test]
    fn test_send_message_payload() {
        let keyboard = InlineKeyboard::start();
        let request = SendMessageRequest {
            chat_id: 42,
            text: "salut",
            parse_mode: "HTML",
            reply_markup: Some(&keyboard),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["parse_mode"], "HTML");
        assert_eq!(
            json["reply_markup"]["inline_keyboard"][0][0]["callback_data"],
            "cmd_matches"
        );

        let plain = SendMessageRequest {
            chat_id: 42,
            text: "salut",
            parse_mode: "HTML",
            reply_markup: None,
        };
        assert!(serde_json::to_value(&plain).unwrap().get("reply_markup").is_none());
    }

    #[test]
    fn test_base_url_trimmed() {
        let config = TelegramConfig {
            api_url: "https://api.telegram.org/".to_string(),
            ..Default::default()
        };
        let api = TelegramApi::new(&config, "123:abc").unwrap();
        assert_eq!(api.base_url, "https://api.telegram.org/bot123:abc");
    }
}
