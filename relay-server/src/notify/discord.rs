//! Chat-webhook channel: Discord-style embed messages.

use chrono::Utc;
use reqwest::Client;
use serde::Serialize;
use tracing::{error, info};

use super::AttemptResult;

/// One name/value pair inside an embed.
#[derive(Debug, Clone, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl EmbedField {
    pub fn new(name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            inline,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

/// Structured embed posted to the chat webhook.
#[derive(Debug, Clone, Serialize)]
pub struct Embed {
    pub title: String,
    pub color: u32,
    pub fields: Vec<EmbedField>,
    /// ISO-8601 submission timestamp.
    pub timestamp: String,
    pub footer: EmbedFooter,
}

impl Embed {
    /// Build an embed stamped with the current time.
    pub fn new(title: impl Into<String>, color: u32, fields: Vec<EmbedField>) -> Self {
        Self {
            title: title.into(),
            color,
            fields,
            timestamp: Utc::now().to_rfc3339(),
            footer: EmbedFooter {
                text: "Form Relay".to_string(),
            },
        }
    }
}

/// Webhook message wrapper: `{"embeds": [ ... ]}`.
#[derive(Serialize)]
struct WebhookMessage<'a> {
    embeds: [&'a Embed; 1],
}

/// POST one embed to the configured webhook URL.
///
/// A 2xx status counts as delivered. Any other status, and any
/// transport failure, becomes a recorded `Failed` outcome; nothing
/// here propagates an error to the caller.
pub async fn send_embed(client: &Client, url: &str, embed: &Embed) -> AttemptResult {
    let message = WebhookMessage { embeds: [embed] };

    match client.post(url).json(&message).send().await {
        Ok(response) => {
            let status = response.status().as_u16();
            if (200..300).contains(&status) {
                info!(status_code = status, title = %embed.title, "discord_send_ok");
                AttemptResult::Delivered(status)
            } else {
                error!(status_code = status, title = %embed.title, "discord_send_failed");
                AttemptResult::Failed {
                    status: Some(status),
                    error: None,
                }
            }
        }
        Err(e) => {
            error!(error = %e, title = %embed.title, "discord_send_error");
            AttemptResult::Failed {
                status: None,
                error: Some(e.to_string()),
            }
        }
    }
}
