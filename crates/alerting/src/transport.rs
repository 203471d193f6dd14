//! Alert transports.

use std::future::Future;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};

use crate::message::AlertMessage;
use crate::AlertError;

/// Per-request delivery timeout.
const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Delivers composed alerts to an external channel.
pub trait AlertTransport: Send + Sync + 'static {
    /// Whether credentials are present and delivery can be attempted.
    fn is_configured(&self) -> bool;

    /// Delivers one alert.
    fn send(&self, message: AlertMessage) -> impl Future<Output = Result<(), AlertError>> + Send;
}

/// Telegram Bot API credentials.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
}

impl TelegramConfig {
    /// Reads credentials from `TELEGRAM_BOT_TOKEN` and `TELEGRAM_CHAT_ID`.
    /// `None` when either is missing or empty.
    pub fn from_env() -> Option<Self> {
        let bot_token = std::env::var("TELEGRAM_BOT_TOKEN")
            .ok()
            .filter(|v| !v.is_empty())?;
        let chat_id = std::env::var("TELEGRAM_CHAT_ID")
            .ok()
            .filter(|v| !v.is_empty())?;
        Some(Self { bot_token, chat_id })
    }
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Telegram Bot API transport.
///
/// Text-only alerts go through `sendMessage`; alerts carrying a snapshot
/// go through `sendPhoto` with the text as caption. Without credentials
/// the transport reports unconfigured and refuses every send.
pub struct TelegramTransport {
    client: Client,
    config: Option<TelegramConfig>,
    api_base: String,
}

impl TelegramTransport {
    pub fn new(config: Option<TelegramConfig>) -> Self {
        Self::with_api_base(config, "https://api.telegram.org")
    }

    /// Points the transport at a different API host, for tests.
    pub fn with_api_base(config: Option<TelegramConfig>, api_base: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            config,
            api_base: api_base.into(),
        }
    }

    fn endpoint(&self, token: &str, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, token, method)
    }

    async fn send_text(&self, config: &TelegramConfig, text: &str) -> Result<(), AlertError> {
        let request = SendMessageRequest {
            chat_id: &config.chat_id,
            text,
        };
        let response = self
            .client
            .post(self.endpoint(&config.bot_token, "sendMessage"))
            .timeout(DELIVERY_TIMEOUT)
            .json(&request)
            .send()
            .await
            .map_err(|e| AlertError::Delivery(e.to_string()))?;

        check_status(response).await
    }

    async fn send_photo(
        &self,
        config: &TelegramConfig,
        caption: &str,
        jpeg: Vec<u8>,
    ) -> Result<(), AlertError> {
        let photo = Part::bytes(jpeg)
            .file_name("detection.jpg")
            .mime_str("image/jpeg")
            .map_err(|e| AlertError::Delivery(e.to_string()))?;
        let form = Form::new()
            .text("chat_id", config.chat_id.clone())
            .text("caption", caption.to_string())
            .part("photo", photo);

        let response = self
            .client
            .post(self.endpoint(&config.bot_token, "sendPhoto"))
            .timeout(DELIVERY_TIMEOUT)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AlertError::Delivery(e.to_string()))?;

        check_status(response).await
    }
}

async fn check_status(response: reqwest::Response) -> Result<(), AlertError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(AlertError::Rejected(format!("{status}: {body}")));
    }
    Ok(())
}

impl AlertTransport for TelegramTransport {
    fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    fn send(&self, message: AlertMessage) -> impl Future<Output = Result<(), AlertError>> + Send {
        async move {
            let config = self.config.as_ref().ok_or(AlertError::NotConfigured)?;
            let AlertMessage { text, image } = message;

            match image {
                Some(jpeg) => {
                    debug!(bytes = jpeg.len(), "sending alert with snapshot");
                    self.send_photo(config, &text, jpeg).await?;
                }
                None => self.send_text(config, &text).await?,
            }
            info!("alert delivered: {text}");
            Ok(())
        }
    }
}
