//! Configuration module for environment variable parsing.
//!
//! Every downstream destination is optional: a missing URL or
//! credential degrades that channel to skipped rather than crashing
//! the process. Channels are modelled as an explicit sum type so the
//! dispatcher's branching stays exhaustive and testable without
//! mutating the environment.

use std::env;

/// Configuration state of one downstream channel or credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelSetting {
    /// No value supplied; attempts on this channel are skipped.
    Unconfigured,
    /// The destination URL, credential, or address to use.
    Configured(String),
}

impl ChannelSetting {
    /// Read a setting from an environment variable. Blank values count
    /// as unconfigured.
    pub fn from_env(name: &str) -> Self {
        match env::var(name) {
            Ok(value) if !value.trim().is_empty() => {
                ChannelSetting::Configured(value.trim().to_string())
            }
            _ => ChannelSetting::Unconfigured,
        }
    }

    pub fn as_configured(&self) -> Option<&str> {
        match self {
            ChannelSetting::Configured(value) => Some(value),
            ChannelSetting::Unconfigured => None,
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, ChannelSetting::Configured(_))
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// Chat webhook URL for contact form notifications
    pub contact_webhook_url: ChannelSetting,

    /// Chat webhook URL for quote form notifications
    pub quote_webhook_url: ChannelSetting,

    /// Chat webhook URL for the signed order relay endpoint
    pub order_relay_webhook_url: ChannelSetting,

    /// Chat webhook URL for the signed quote relay endpoint
    pub quote_relay_webhook_url: ChannelSetting,

    /// SendGrid API key for the transactional email channel
    pub sendgrid_api_key: ChannelSetting,

    /// SendGrid API base URL (overridable for tests)
    pub sendgrid_api_base: String,

    /// From address for outbound email
    pub from_email: String,

    /// From display name for outbound email
    pub from_name: String,

    /// Admin address for the manual-processing fallback email
    pub admin_email: ChannelSetting,

    /// Shared secret for inbound webhook signature verification.
    /// Unconfigured skips verification entirely (dev-mode bypass).
    pub webhook_secret: ChannelSetting,

    /// Outbound HTTP request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables. Never fails;
    /// absent settings degrade the affected channel.
    pub fn from_env() -> Self {
        Config {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),

            contact_webhook_url: ChannelSetting::from_env("DISCORD_CONTACT_WEBHOOK_URL"),

            quote_webhook_url: ChannelSetting::from_env("DISCORD_QUOTE_WEBHOOK_URL"),

            order_relay_webhook_url: ChannelSetting::from_env("DISCORD_ORDER_WEBHOOK_URL"),

            quote_relay_webhook_url: ChannelSetting::from_env("DISCORD_QUOTE_RELAY_WEBHOOK_URL"),

            sendgrid_api_key: ChannelSetting::from_env("SENDGRID_API_KEY"),

            sendgrid_api_base: env::var("SENDGRID_API_BASE")
                .unwrap_or_else(|_| "https://api.sendgrid.com".to_string()),

            from_email: env::var("FROM_EMAIL")
                .unwrap_or_else(|_| "no-reply@example.com".to_string()),

            from_name: env::var("FROM_NAME").unwrap_or_else(|_| "Form Relay".to_string()),

            admin_email: ChannelSetting::from_env("ADMIN_EMAIL"),

            webhook_secret: ChannelSetting::from_env("WEBHOOK_SECRET"),

            request_timeout_ms: env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_setting_from_env_blank_is_unconfigured() {
        env::set_var("TEST_BLANK_CHANNEL", "   ");
        assert_eq!(
            ChannelSetting::from_env("TEST_BLANK_CHANNEL"),
            ChannelSetting::Unconfigured
        );
        env::remove_var("TEST_BLANK_CHANNEL");
    }

    #[test]
    fn test_channel_setting_from_env_trims() {
        env::set_var("TEST_URL_CHANNEL", " https://example.com/hook ");
        assert_eq!(
            ChannelSetting::from_env("TEST_URL_CHANNEL"),
            ChannelSetting::Configured("https://example.com/hook".to_string())
        );
        env::remove_var("TEST_URL_CHANNEL");
    }

    #[test]
    fn test_channel_setting_accessors() {
        let configured = ChannelSetting::Configured("key".to_string());
        assert!(configured.is_configured());
        assert_eq!(configured.as_configured(), Some("key"));
        assert!(!ChannelSetting::Unconfigured.is_configured());
        assert_eq!(ChannelSetting::Unconfigured.as_configured(), None);
    }
}
