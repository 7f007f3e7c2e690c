//! Notification dispatch: the fallback ladder.
//!
//! Every validated submission runs the same ordered sequence:
//!
//! ```text
//! Submission → PrimaryAttempt (chat webhook)
//!            → SecondaryAttempt (confirmation email, form-dependent)
//!            → AdminFallback (only when primary missed)
//!            → RecoveryLog (only when both channels missed)
//! ```
//!
//! Downstream failures are expected and degrade gracefully: each
//! channel gets exactly one attempt, transport errors are folded into
//! the same outcome as non-success statuses, and nothing past
//! validation ever fails the caller's request. A submission is either
//! delivered, escalated to an admin, or recoverable from the logs.

pub mod discord;
pub mod sendgrid;

use std::sync::Arc;

use reqwest::Client;
use tracing::{error, info, warn};

use crate::config::{ChannelSetting, Config};
use discord::Embed;
use sendgrid::{EmailMessage, MailAddress};

/// Result of one delivery attempt on one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptResult {
    /// Accepted by the channel, with the HTTP status.
    Delivered(u16),
    /// Attempted and refused, or the transport failed.
    Failed {
        status: Option<u16>,
        error: Option<String>,
    },
    /// Not attempted: channel unconfigured or not applicable.
    Skipped,
}

impl AttemptResult {
    pub fn delivered(&self) -> bool {
        matches!(self, AttemptResult::Delivered(_))
    }
}

/// Which channel an outcome belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Primary,
    Secondary,
}

/// Per-channel outcome, consumed when deciding fallback and logging.
#[derive(Debug, Clone)]
pub struct NotificationOutcome {
    pub channel: Channel,
    pub delivered: bool,
    pub status: Option<u16>,
    pub error: Option<String>,
}

impl NotificationOutcome {
    fn from_attempt(channel: Channel, attempt: &AttemptResult) -> Self {
        match attempt {
            AttemptResult::Delivered(status) => Self {
                channel,
                delivered: true,
                status: Some(*status),
                error: None,
            },
            AttemptResult::Failed { status, error } => Self {
                channel,
                delivered: false,
                status: *status,
                error: error.clone(),
            },
            AttemptResult::Skipped => Self {
                channel,
                delivered: false,
                status: None,
                error: None,
            },
        }
    }
}

/// One validated, sanitized submission ready for delivery.
///
/// Immutable for the lifetime of its request; never shared across
/// requests. Built by the per-form builders in [`crate::forms`].
#[derive(Debug, Clone)]
pub struct Notification {
    /// Form type tag used in logs and the admin fallback subject.
    pub form: &'static str,
    /// Chat webhook destination; `None` skips the primary attempt.
    pub webhook_url: Option<String>,
    pub embed: Embed,
    /// Confirmation email; `None` for pure relay forms, which have no
    /// secondary channel at all.
    pub auto_reply: Option<EmailMessage>,
    /// Human-readable labels appended to the admin fallback table.
    pub admin_context: Vec<(String, String)>,
    /// Sanitized field/value pairs for the admin table and recovery log.
    pub fields: Vec<(String, String)>,
}

/// Delivery report for one request. Informational only; handlers
/// return success to the submitter regardless of its contents.
#[derive(Debug, Clone)]
pub struct DispatchReport {
    pub primary: NotificationOutcome,
    pub secondary: NotificationOutcome,
    pub admin_notified: bool,
    pub recovery_logged: bool,
}

/// Orchestrates the fallback ladder over a shared HTTP client.
pub struct Dispatcher {
    client: Client,
    config: Arc<Config>,
}

impl Dispatcher {
    pub fn new(client: Client, config: Arc<Config>) -> Self {
        Self { client, config }
    }

    /// Run the full ladder for one submission.
    pub async fn dispatch(&self, note: &Notification) -> DispatchReport {
        let primary = match &note.webhook_url {
            Some(url) => discord::send_embed(&self.client, url, &note.embed).await,
            None => {
                info!(form = note.form, "primary_channel_unconfigured");
                AttemptResult::Skipped
            }
        };

        // Attempted independently of the primary outcome.
        let secondary = match (&note.auto_reply, self.config.sendgrid_api_key.as_configured()) {
            (Some(reply), Some(key)) => {
                sendgrid::send_mail(
                    &self.client,
                    &self.config.sendgrid_api_base,
                    key,
                    &self.from_address(),
                    reply,
                )
                .await
            }
            (Some(_), None) => {
                warn!(form = note.form, "email_channel_unconfigured");
                AttemptResult::Skipped
            }
            (None, _) => AttemptResult::Skipped,
        };

        let mut admin_notified = false;
        if needs_admin_fallback(&primary, &self.config.admin_email, &self.config.sendgrid_api_key)
        {
            // Fire-and-forget: this send's outcome is logged but never
            // escalated into a further fallback.
            let admin = self
                .config
                .admin_email
                .as_configured()
                .unwrap_or_default();
            let key = self
                .config
                .sendgrid_api_key
                .as_configured()
                .unwrap_or_default();
            let message = admin_fallback_email(note, admin);
            let result = sendgrid::send_mail(
                &self.client,
                &self.config.sendgrid_api_base,
                key,
                &self.from_address(),
                &message,
            )
            .await;

            if let AttemptResult::Failed { status, error } = &result {
                error!(
                    form = note.form,
                    status = ?status,
                    error = ?error,
                    "admin_fallback_failed"
                );
            }
            admin_notified = result.delivered();
        }

        let recovery_logged = needs_recovery_log(&primary, &secondary);
        if recovery_logged {
            // Last-resort durability: the full sanitized submission is
            // recoverable from operational logs.
            let submission: serde_json::Map<String, serde_json::Value> = note
                .fields
                .iter()
                .map(|(name, value)| (name.clone(), serde_json::Value::String(value.clone())))
                .collect();
            error!(
                form = note.form,
                submission = %serde_json::Value::Object(submission),
                "submission_recovery"
            );
        }

        info!(
            form = note.form,
            primary_delivered = primary.delivered(),
            secondary_delivered = secondary.delivered(),
            admin_notified = admin_notified,
            recovery_logged = recovery_logged,
            "dispatch_complete"
        );

        DispatchReport {
            primary: NotificationOutcome::from_attempt(Channel::Primary, &primary),
            secondary: NotificationOutcome::from_attempt(Channel::Secondary, &secondary),
            admin_notified,
            recovery_logged,
        }
    }

    fn from_address(&self) -> MailAddress {
        MailAddress::new(
            self.config.from_email.clone(),
            Some(self.config.from_name.clone()),
        )
    }
}

/// The admin fallback fires when the primary channel did not deliver
/// (failed or skipped) and both the admin address and the email
/// credential are configured.
fn needs_admin_fallback(
    primary: &AttemptResult,
    admin_email: &ChannelSetting,
    api_key: &ChannelSetting,
) -> bool {
    !primary.delivered() && admin_email.is_configured() && api_key.is_configured()
}

/// The recovery log fires when neither channel delivered, counting
/// skipped-unconfigured attempts the same as failed ones.
fn needs_recovery_log(primary: &AttemptResult, secondary: &AttemptResult) -> bool {
    !primary.delivered() && !secondary.delivered()
}

/// Build the "manual processing required" email: every submitted
/// field/value pair as a table row, followed by any human-readable
/// label context the form supplies.
fn admin_fallback_email(note: &Notification, admin_email: &str) -> EmailMessage {
    let mut rows = String::new();
    for (name, value) in note.fields.iter().chain(note.admin_context.iter()) {
        rows.push_str(&format!(
            "<tr><td><strong>{}</strong></td><td>{}</td></tr>",
            name, value
        ));
    }

    EmailMessage {
        to: MailAddress::new(admin_email, None),
        subject: format!("Manual processing required: {} submission", note.form),
        html: format!(
            "<p>The chat notification for a {} submission could not be delivered. \
             Submission details:</p><table>{}</table>",
            note.form, rows
        ),
    }
}
