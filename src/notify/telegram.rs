//! Telegram Bot API delivery channel.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::DeliveryError;
use crate::models::{Petition, Subscriber};
use crate::notify::callback::CallbackToken;
use crate::notify::{template, Notifier};

const API_BASE: &str = "https://api.telegram.org";

/// Bot API code reported when a recipient blocked the bot.
const FORBIDDEN: u16 = 403;

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'static str,
    link_preview_options: LinkPreviewOptions,
    reply_markup: ReplyMarkup,
}

#[derive(Serialize)]
struct LinkPreviewOptions {
    is_disabled: bool,
}

#[derive(Serialize)]
struct ReplyMarkup {
    inline_keyboard: Vec<Vec<InlineButton>>,
}

#[derive(Serialize)]
struct InlineButton {
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    callback_data: Option<String>,
}

impl InlineButton {
    fn link(text: &str, url: &str) -> Self {
        Self {
            text: text.to_string(),
            url: Some(url.to_string()),
            callback_data: None,
        }
    }

    fn callback(text: &str, token: &CallbackToken) -> Self {
        Self {
            text: text.to_string(),
            url: None,
            callback_data: Some(token.encode()),
        }
    }
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    error_code: Option<u16>,
    #[serde(default)]
    description: Option<String>,
}

/// Sends petition notifications through the Telegram Bot API.
pub struct TelegramNotifier {
    client: Client,
    send_message_url: String,
}

impl TelegramNotifier {
    pub fn new(token: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            send_message_url: format!("{API_BASE}/bot{token}/sendMessage"),
        })
    }

    fn keyboard(petition: &Petition) -> ReplyMarkup {
        ReplyMarkup {
            inline_keyboard: vec![
                vec![InlineButton::link("📄 Переглянути петицію", &petition.link)],
                vec![InlineButton::callback(
                    "⭐️ Додати до обраного",
                    &CallbackToken::select(&petition.number),
                )],
            ],
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_petition(
        &self,
        subscriber: &Subscriber,
        petition: &Petition,
    ) -> Result<(), DeliveryError> {
        let text = template::render(petition);
        let payload = SendMessage {
            chat_id: subscriber.id,
            text: &text,
            parse_mode: "HTML",
            link_preview_options: LinkPreviewOptions { is_disabled: true },
            reply_markup: Self::keyboard(petition),
        };

        let response = self
            .client
            .post(&self.send_message_url)
            .json(&payload)
            .send()
            .await
            .map_err(|err| DeliveryError::Transient(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let error: ApiError = response.json().await.unwrap_or(ApiError {
            error_code: None,
            description: None,
        });

        if status.as_u16() == FORBIDDEN || error.error_code == Some(FORBIDDEN) {
            return Err(DeliveryError::Revoked);
        }

        Err(DeliveryError::Transient(
            error
                .description
                .unwrap_or_else(|| format!("HTTP {status}")),
        ))
    }
}
