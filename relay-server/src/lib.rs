//! FormRelay - website form submission relay.
//!
//! Accepts form submissions (contact, quote request, order webhook)
//! over HTTP, validates and sanitizes them, and relays each one
//! through two downstream notification channels with a deterministic
//! fallback ladder:
//!
//! ```text
//! Submission → chat webhook → confirmation email
//!                  ↓ (primary missed)
//!            admin fallback email
//!                  ↓ (both channels missed)
//!            recovery log entry
//! ```
//!
//! A submission is never lost silently: it is delivered, escalated to
//! an admin, or recoverable from operational logs.

pub mod config;
pub mod forms;
pub mod notify;
pub mod sanitize;
pub mod web;

// Re-export commonly used types
pub use config::{ChannelSetting, Config};
pub use notify::{AttemptResult, Dispatcher, Notification, NotificationOutcome};
pub use web::{router, AppState, RateLimiter};
