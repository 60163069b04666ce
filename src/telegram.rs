//! Telegram Bot API transport: long-poll updates in, replies out.

use reqwest::multipart;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::path::Path;
use tracing::{error, info};

use crate::error::Error;
use crate::TARGET_WEB_REQUEST;

const API_BASE: &str = "https://api.telegram.org";
const POLL_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct BotIdentity {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

pub struct TelegramClient {
    client: reqwest::Client,
    base: String,
}

impl TelegramClient {
    pub fn new(token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base: format!("{}/bot{}", API_BASE, token),
        }
    }

    /// Identify the bot account; used once at startup to confirm the token.
    pub async fn get_me(&self) -> Result<BotIdentity, Error> {
        self.call("getMe", json!({})).await
    }

    /// Long-poll for updates newer than `offset`. The server holds the
    /// request open for up to a minute, so an empty reply is normal.
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, Error> {
        self.call(
            "getUpdates",
            json!({ "offset": offset, "timeout": POLL_TIMEOUT_SECS }),
        )
        .await
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) {
        let payload = json!({ "chat_id": chat_id, "text": text });
        match self.call::<serde_json::Value>("sendMessage", payload).await {
            Ok(_) => info!(target: TARGET_WEB_REQUEST, " ** Message sent to chat {}", chat_id),
            Err(err) => error!(target: TARGET_WEB_REQUEST, " !! Error sending message: {}", err),
        }
    }

    pub async fn send_photo(&self, chat_id: i64, path: &Path) {
        self.send_file("sendPhoto", "photo", chat_id, path).await;
    }

    pub async fn send_voice(&self, chat_id: i64, path: &Path) {
        self.send_file("sendVoice", "voice", chat_id, path).await;
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        payload: serde_json::Value,
    ) -> Result<T, Error> {
        let url = format!("{}/{}", self.base, method);
        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|err| Error::Fetch {
                url: method.to_string(),
                reason: err.to_string(),
            })?;
        let api: ApiResponse<T> = response.json().await.map_err(|err| Error::Fetch {
            url: method.to_string(),
            reason: err.to_string(),
        })?;
        if !api.ok {
            return Err(Error::Fetch {
                url: method.to_string(),
                reason: api
                    .description
                    .unwrap_or_else(|| "request rejected".to_string()),
            });
        }
        api.result
            .ok_or_else(|| Error::Parse(format!("{} reply carried no result", method)))
    }

    async fn send_file(&self, method: &str, field: &str, chat_id: i64, path: &Path) {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(err) => {
                error!(target: TARGET_WEB_REQUEST, " !! Cannot read {} for upload: {}", path.display(), err);
                return;
            }
        };
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());
        let form = multipart::Form::new()
            .text("chat_id", chat_id.to_string())
            .part(field.to_string(), multipart::Part::bytes(bytes).file_name(file_name));

        let result = self
            .client
            .post(format!("{}/{}", self.base, method))
            .multipart(form)
            .send()
            .await;
        match result {
            Ok(response) if response.status().is_success() => {
                info!(target: TARGET_WEB_REQUEST, " ** {} sent to chat {}", field, chat_id);
            }
            Ok(response) => {
                let body = response.text().await.unwrap_or_default();
                error!(target: TARGET_WEB_REQUEST, " !! Error sending {}: {}", field, body);
            }
            Err(err) => {
                error!(target: TARGET_WEB_REQUEST, " !! Error sending {}: {:?}", field, err);
            }
        }
    }
}
