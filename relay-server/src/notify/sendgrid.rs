//! Transactional email channel: SendGrid v3 mail send.

use reqwest::Client;
use serde::Serialize;
use tracing::{error, info};

use super::AttemptResult;

/// Path of the mail send endpoint, appended to the configured API base.
pub const MAIL_SEND_PATH: &str = "/v3/mail/send";

/// An email address with an optional display name.
#[derive(Debug, Clone, Serialize)]
pub struct MailAddress {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl MailAddress {
    pub fn new(email: impl Into<String>, name: Option<String>) -> Self {
        Self {
            email: email.into(),
            name,
        }
    }
}

/// One outbound message with a rendered HTML body.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: MailAddress,
    pub subject: String,
    pub html: String,
}

#[derive(Serialize)]
struct Personalization<'a> {
    to: [&'a MailAddress; 1],
    subject: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    content_type: &'static str,
    value: &'a str,
}

/// SendGrid v3 mail send request body.
#[derive(Serialize)]
struct MailSendRequest<'a> {
    personalizations: [Personalization<'a>; 1],
    from: &'a MailAddress,
    content: [Content<'a>; 1],
}

/// POST one message to the mail API with a bearer credential.
///
/// Status < 400 counts as delivered; anything else, including
/// transport failures, becomes a recorded `Failed` outcome.
pub async fn send_mail(
    client: &Client,
    api_base: &str,
    api_key: &str,
    from: &MailAddress,
    message: &EmailMessage,
) -> AttemptResult {
    let body = MailSendRequest {
        personalizations: [Personalization {
            to: [&message.to],
            subject: &message.subject,
        }],
        from,
        content: [Content {
            content_type: "text/html",
            value: &message.html,
        }],
    };

    let url = format!("{}{}", api_base.trim_end_matches('/'), MAIL_SEND_PATH);

    match client.post(&url).bearer_auth(api_key).json(&body).send().await {
        Ok(response) => {
            let status = response.status().as_u16();
            if status < 400 {
                info!(status_code = status, to = %message.to.email, "sendgrid_send_ok");
                AttemptResult::Delivered(status)
            } else {
                error!(status_code = status, to = %message.to.email, "sendgrid_send_failed");
                AttemptResult::Failed {
                    status: Some(status),
                    error: None,
                }
            }
        }
        Err(e) => {
            error!(error = %e, to = %message.to.email, "sendgrid_send_error");
            AttemptResult::Failed {
                status: None,
                error: Some(e.to_string()),
            }
        }
    }
}
