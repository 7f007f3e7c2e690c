//! Fallback ladder tests against the dispatcher itself.
//!
//! Drives `Dispatcher::dispatch` with wiremock downstreams and asserts
//! the returned report, in particular the recovery-log marker: a
//! submission that neither channel accepted must be flagged as
//! recoverable, and one that any channel accepted must not.

use std::sync::Arc;
use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use formrelay::config::{ChannelSetting, Config};
use formrelay::notify::discord::{Embed, EmbedField};
use formrelay::notify::sendgrid::{EmailMessage, MailAddress};
use formrelay::notify::{Dispatcher, Notification};

fn base_config() -> Config {
    Config {
        port: 0,
        contact_webhook_url: ChannelSetting::Unconfigured,
        quote_webhook_url: ChannelSetting::Unconfigured,
        order_relay_webhook_url: ChannelSetting::Unconfigured,
        quote_relay_webhook_url: ChannelSetting::Unconfigured,
        sendgrid_api_key: ChannelSetting::Unconfigured,
        sendgrid_api_base: "http://127.0.0.1:9".to_string(),
        from_email: "no-reply@example.com".to_string(),
        from_name: "Form Relay".to_string(),
        admin_email: ChannelSetting::Unconfigured,
        webhook_secret: ChannelSetting::Unconfigured,
        request_timeout_ms: 2000,
    }
}

fn dispatcher(config: Config) -> Dispatcher {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(2000))
        .build()
        .unwrap();
    Dispatcher::new(client, Arc::new(config))
}

fn contact_note(webhook_url: Option<String>, auto_reply: bool) -> Notification {
    Notification {
        form: "contact",
        webhook_url,
        embed: Embed::new(
            "Contact Form Submission",
            0x3498db,
            vec![EmbedField::new("Name", "Ann", true)],
        ),
        auto_reply: auto_reply.then(|| EmailMessage {
            to: MailAddress::new("ann@x.com", Some("Ann".to_string())),
            subject: "We received your message".to_string(),
            html: "<p>Hi Ann</p>".to_string(),
        }),
        admin_context: Vec::new(),
        fields: vec![
            ("Name".to_string(), "Ann".to_string()),
            ("Message".to_string(), "hi".to_string()),
        ],
    }
}

#[tokio::test]
async fn both_channels_failing_marks_submission_recoverable() {
    let chat = MockServer::start().await;
    let mail = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&chat)
        .await;

    Mock::given(method("POST"))
        .and(path("/v3/mail/send"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mail)
        .await;

    let mut config = base_config();
    config.sendgrid_api_key = ChannelSetting::Configured("sg-test".to_string());
    config.sendgrid_api_base = mail.uri();

    let note = contact_note(Some(format!("{}/hook", chat.uri())), true);
    let report = dispatcher(config).dispatch(&note).await;

    assert!(!report.primary.delivered);
    assert_eq!(report.primary.status, Some(500));
    assert!(!report.secondary.delivered);
    assert!(!report.admin_notified);
    assert!(report.recovery_logged);
}

#[tokio::test]
async fn fully_unconfigured_channels_mark_submission_recoverable() {
    // Skipped-because-unconfigured counts the same as attempted-and-
    // failed: nothing delivered, so the submission must be flagged.
    let note = contact_note(None, true);
    let report = dispatcher(base_config()).dispatch(&note).await;

    assert!(!report.primary.delivered);
    assert!(!report.secondary.delivered);
    assert!(report.recovery_logged);
}

#[tokio::test]
async fn delivered_secondary_suppresses_recovery_marker() {
    let chat = MockServer::start().await;
    let mail = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&chat)
        .await;

    // Confirmation plus admin fallback, both accepted.
    Mock::given(method("POST"))
        .and(path("/v3/mail/send"))
        .respond_with(ResponseTemplate::new(202))
        .expect(2)
        .mount(&mail)
        .await;

    let mut config = base_config();
    config.sendgrid_api_key = ChannelSetting::Configured("sg-test".to_string());
    config.sendgrid_api_base = mail.uri();
    config.admin_email = ChannelSetting::Configured("admin@example.com".to_string());

    let note = contact_note(Some(format!("{}/hook", chat.uri())), true);
    let report = dispatcher(config).dispatch(&note).await;

    assert!(!report.primary.delivered);
    assert!(report.secondary.delivered);
    assert!(report.admin_notified);
    assert!(!report.recovery_logged);
}

#[tokio::test]
async fn delivered_primary_runs_no_fallback_at_all() {
    let chat = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&chat)
        .await;

    // Admin is configured but the email credential is not; a relay
    // note has no auto-reply, so no mail traffic can occur.
    let mut config = base_config();
    config.admin_email = ChannelSetting::Configured("admin@example.com".to_string());

    let note = contact_note(Some(format!("{}/hook", chat.uri())), false);
    let report = dispatcher(config).dispatch(&note).await;

    assert!(report.primary.delivered);
    assert!(!report.secondary.delivered);
    assert!(!report.admin_notified);
    assert!(!report.recovery_logged);
}
