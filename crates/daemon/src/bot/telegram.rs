//! Long-polling adapter for the Telegram Bot HTTP API.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use url::Url;

use crate::ServiceState;

const API_BASE: &str = "https://api.telegram.org";
/// Seconds the server may hold a `getUpdates` call open.
const POLL_TIMEOUT_SECS: u64 = 60;
const RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub id: i64,
}

#[derive(Serialize)]
struct GetUpdates {
    offset: i64,
    timeout: u64,
    allowed_updates: [&'static str; 1],
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
}

#[derive(Debug, thiserror::Error)]
pub enum BotError {
    // reqwest errors are stripped of their URL, which embeds the token
    #[error("bot request failed: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("invalid bot endpoint: {0}")]
    Url(#[from] url::ParseError),
    #[error("bot API error: {0}")]
    Api(String),
}

pub struct TelegramBot {
    client: Client,
    endpoint: Url,
}

impl std::fmt::Debug for TelegramBot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramBot").finish_non_exhaustive()
    }
}

impl TelegramBot {
    pub fn new(token: &str) -> Result<Self, BotError> {
        Self::with_api_base(&Url::parse(API_BASE)?, token)
    }

    pub fn with_api_base(api_base: &Url, token: &str) -> Result<Self, BotError> {
        // the token holds a ':', so it cannot go through `Url::join`
        let endpoint = Url::parse(&format!(
            "{}/bot{}/",
            api_base.as_str().trim_end_matches('/'),
            token
        ))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(POLL_TIMEOUT_SECS + 10))
            .build()
            .map_err(|e| BotError::Reqwest(e.without_url()))?;
        Ok(Self { client, endpoint })
    }

    async fn call<B: Serialize, T: DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<T, BotError> {
        let url = self.endpoint.join(method)?;
        let envelope: Envelope<T> = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| BotError::Reqwest(e.without_url()))?
            .json()
            .await
            .map_err(|e| BotError::Reqwest(e.without_url()))?;

        match envelope {
            Envelope {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            Envelope { description, .. } => Err(BotError::Api(
                description.unwrap_or_else(|| format!("{} failed", method)),
            )),
        }
    }

    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, BotError> {
        self.call(
            "getUpdates",
            &GetUpdates {
                offset,
                timeout: POLL_TIMEOUT_SECS,
                allowed_updates: ["message"],
            },
        )
        .await
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), BotError> {
        let _: serde_json::Value = self
            .call("sendMessage", &SendMessage { chat_id, text })
            .await?;
        Ok(())
    }
}

/// Poll for messages and answer them until the shutdown watch fires.
pub async fn run(
    bot: TelegramBot,
    state: ServiceState,
    mut shutdown_rx: watch::Receiver<()>,
) -> Result<(), BotError> {
    tracing::info!("chat bot polling for updates");
    let mut offset = 0;

    loop {
        let polled = tokio::select! {
            _ = shutdown_rx.changed() => break,
            polled = bot.get_updates(offset) => polled,
        };

        let updates = match polled {
            Ok(updates) => updates,
            Err(e) => {
                tracing::warn!(error = %e, "polling for updates failed, retrying");
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    _ = tokio::time::sleep(RETRY_DELAY) => continue,
                }
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);
            let Some(message) = update.message else {
                continue;
            };
            let (Some(from), Some(text)) = (message.from, message.text) else {
                continue;
            };

            let owner = from.id;
            let reply = state
                .run(move |kv| Ok(super::handle_message(kv, owner, &text)))
                .await;
            match reply {
                Ok(Some(reply)) => {
                    if let Err(e) = bot.send_message(message.chat.id, &reply).await {
                        tracing::warn!(owner, error = %e, "failed to send reply");
                    }
                }
                Ok(None) => {}
                Err(e) => tracing::error!(owner, error = %e, "bot command task failed"),
            }
        }
    }

    tracing::info!("chat bot stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_keeps_token_path() {
        let bot = TelegramBot::new("123:abc").unwrap();
        assert_eq!(
            bot.endpoint.join("getUpdates").unwrap().as_str(),
            "https://api.telegram.org/bot123:abc/getUpdates"
        );
    }

    #[test]
    fn test_decode_updates() {
        let raw = r#"{
            "ok": true,
            "result": [
                {"update_id": 7, "message": {"message_id": 1, "chat": {"id": 99, "type": "private"},
                 "from": {"id": 42, "is_bot": false, "first_name": "A"}, "text": "/create_kv"}},
                {"update_id": 8, "edited_message": {}}
            ]
        }"#;
        let envelope: Envelope<Vec<Update>> = serde_json::from_str(raw).unwrap();
        assert!(envelope.ok);

        let updates = envelope.result.unwrap();
        assert_eq!(updates.len(), 2);
        let message = updates[0].message.as_ref().unwrap();
        assert_eq!(message.chat.id, 99);
        assert_eq!(message.from.as_ref().unwrap().id, 42);
        assert_eq!(message.text.as_deref(), Some("/create_kv"));
        assert!(updates[1].message.is_none());
    }

    #[test]
    fn test_decode_api_error() {
        let raw = r#"{"ok": false, "error_code": 401, "description": "Unauthorized"}"#;
        let envelope: Envelope<Vec<Update>> = serde_json::from_str(raw).unwrap();
        assert!(!envelope.ok);
        assert_eq!(envelope.description.as_deref(), Some("Unauthorized"));
    }
}
