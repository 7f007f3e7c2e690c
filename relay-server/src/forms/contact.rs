//! Contact form: validation, embed, and confirmation templates.

use serde_json::{Map, Value};

use super::{optional_field, require_fields, str_field};
use crate::notify::discord::{Embed, EmbedField};
use crate::notify::sendgrid::{EmailMessage, MailAddress};
use crate::notify::Notification;
use crate::sanitize::{detect_faq, sanitize_email, sanitize_phone, sanitize_string};

pub const REQUIRED_FIELDS: &[&str] = &["name", "email", "message"];

const EMBED_COLOR: u32 = 0x3498db;

/// Validate and sanitize a contact submission.
///
/// The chat destination is filled in by the handler; FAQ detection on
/// the message selects the confirmation template variant and never
/// rejects.
pub fn build(payload: &Map<String, Value>) -> Result<Notification, String> {
    require_fields(payload, REQUIRED_FIELDS)?;

    let name = sanitize_string(str_field(payload, "name"));
    let email = sanitize_email(str_field(payload, "email"));
    let message = sanitize_string(str_field(payload, "message"));
    let phone = {
        let phone = sanitize_phone(str_field(payload, "phone"));
        if phone.trim().is_empty() {
            None
        } else {
            Some(phone)
        }
    };
    let subject = optional_field(payload, "subject");

    let faq = detect_faq(&message);

    let mut embed_fields = vec![
        EmbedField::new("Name", name.clone(), true),
        EmbedField::new("Email", email.clone(), true),
    ];
    if let Some(phone) = &phone {
        embed_fields.push(EmbedField::new("Phone", phone.clone(), true));
    }
    if let Some(subject) = &subject {
        embed_fields.push(EmbedField::new("Subject", subject.clone(), false));
    }
    embed_fields.push(EmbedField::new("Message", message.clone(), false));

    let mut fields = vec![
        ("Name".to_string(), name.clone()),
        ("Email".to_string(), email.clone()),
    ];
    if let Some(phone) = &phone {
        fields.push(("Phone".to_string(), phone.clone()));
    }
    if let Some(subject) = &subject {
        fields.push(("Subject".to_string(), subject.clone()));
    }
    fields.push(("Message".to_string(), message));

    // A submission whose email failed the shape check still goes
    // through; there is just no address to confirm to.
    let auto_reply = if email.is_empty() {
        None
    } else {
        Some(EmailMessage {
            to: MailAddress::new(email, Some(name.clone())),
            subject: "We received your message".to_string(),
            html: confirmation_html(&name, faq),
        })
    };

    Ok(Notification {
        form: "contact",
        webhook_url: None,
        embed: Embed::new("Contact Form Submission", EMBED_COLOR, embed_fields),
        auto_reply,
        admin_context: Vec::new(),
        fields,
    })
}

fn confirmation_html(name: &str, faq: bool) -> String {
    let mut html = format!(
        "<p>Hi {},</p>\
         <p>Thanks for reaching out. We received your message and will get back \
         to you within one business day.</p>",
        name
    );
    if faq {
        html.push_str(
            "<p>Your question may already be answered on our FAQ page: opening \
             hours, shipping and delivery times, pricing, accepted artwork \
             formats, and minimum order quantities are all covered there.</p>",
        );
    }
    html.push_str("<p>&mdash; The Shop Team</p>");
    html
}
