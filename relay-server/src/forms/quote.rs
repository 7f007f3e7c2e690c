//! Quote request form: validation, enum sets, embed, and templates.
//!
//! Two flavors share the field set: the public website form (with a
//! confirmation email) and the signed relay endpoint (chat-only, no
//! secondary channel).

use serde_json::{Map, Value};

use super::{optional_field, require_fields, str_field};
use crate::notify::discord::{Embed, EmbedField};
use crate::notify::sendgrid::{EmailMessage, MailAddress};
use crate::notify::Notification;
use crate::sanitize::{
    coerce_quantity, sanitize_email, sanitize_phone, sanitize_string, validate_enum,
};

pub const REQUIRED_FIELDS: &[&str] = &["name", "email", "service", "timeline"];

pub const ALLOWED_SERVICES: &[&str] = &["screen-printing", "embroidery", "dtg", "vinyl"];

pub const ALLOWED_TIMELINES: &[&str] = &["rush", "1-2-weeks", "2-4-weeks", "flexible"];

const EMBED_COLOR: u32 = 0x2ecc71;
const RELAY_EMBED_COLOR: u32 = 0x9b59b6;

/// Validate and sanitize a quote submission from the website form.
pub fn build(payload: &Map<String, Value>) -> Result<Notification, String> {
    build_inner(payload, false)
}

/// Validate and sanitize a quote submission arriving over the signed
/// relay webhook. Relay submissions never get an auto-reply.
pub fn build_relay(payload: &Map<String, Value>) -> Result<Notification, String> {
    build_inner(payload, true)
}

fn build_inner(payload: &Map<String, Value>, relay: bool) -> Result<Notification, String> {
    require_fields(payload, REQUIRED_FIELDS)?;

    let service = sanitize_string(str_field(payload, "service"));
    validate_enum("service", &service, ALLOWED_SERVICES)?;
    let timeline = sanitize_string(str_field(payload, "timeline"));
    validate_enum("timeline", &timeline, ALLOWED_TIMELINES)?;

    let name = sanitize_string(str_field(payload, "name"));
    let email = sanitize_email(str_field(payload, "email"));
    let company = optional_field(payload, "company");
    let details = optional_field(payload, "details");
    let phone = {
        let phone = sanitize_phone(str_field(payload, "phone"));
        if phone.trim().is_empty() {
            None
        } else {
            Some(phone)
        }
    };
    // Malformed quantity coerces to 0 and is never a rejection reason;
    // null or blank counts as absent and is omitted from the embed.
    let quantity = payload
        .get("quantity")
        .filter(|value| {
            !value.is_null() && value.as_str().map_or(true, |s| !s.trim().is_empty())
        })
        .map(coerce_quantity);

    let service_name = service_label(&service);
    let timeline_name = timeline_label(&timeline);

    let mut embed_fields = vec![
        EmbedField::new("Name", name.clone(), true),
        EmbedField::new("Email", email.clone(), true),
    ];
    if let Some(company) = &company {
        embed_fields.push(EmbedField::new("Company", company.clone(), true));
    }
    if let Some(phone) = &phone {
        embed_fields.push(EmbedField::new("Phone", phone.clone(), true));
    }
    embed_fields.push(EmbedField::new("Service", service_name, true));
    embed_fields.push(EmbedField::new("Timeline", timeline_name, true));
    if let Some(quantity) = quantity {
        embed_fields.push(EmbedField::new("Quantity", quantity.to_string(), true));
    }
    if let Some(details) = &details {
        embed_fields.push(EmbedField::new("Details", details.clone(), false));
    }

    let mut fields = vec![
        ("Name".to_string(), name.clone()),
        ("Email".to_string(), email.clone()),
    ];
    if let Some(company) = &company {
        fields.push(("Company".to_string(), company.clone()));
    }
    if let Some(phone) = &phone {
        fields.push(("Phone".to_string(), phone.clone()));
    }
    fields.push(("Service".to_string(), service.clone()));
    fields.push(("Timeline".to_string(), timeline.clone()));
    if let Some(quantity) = quantity {
        fields.push(("Quantity".to_string(), quantity.to_string()));
    }
    if let Some(details) = &details {
        fields.push(("Details".to_string(), details.clone()));
    }

    let auto_reply = if relay || email.is_empty() {
        None
    } else {
        Some(EmailMessage {
            to: MailAddress::new(email, Some(name.clone())),
            subject: "Your quote request is in".to_string(),
            html: confirmation_html(&name, service_name, timeline_name),
        })
    };

    let (form, title, color) = if relay {
        ("quote-relay", "Quote Request (Webhook)", RELAY_EMBED_COLOR)
    } else {
        ("quote", "Quote Request", EMBED_COLOR)
    };

    Ok(Notification {
        form,
        webhook_url: None,
        embed: Embed::new(title, color, embed_fields),
        auto_reply,
        // Human-readable names rather than raw enum codes, for the
        // admin fallback table.
        admin_context: vec![
            ("Service".to_string(), service_name.to_string()),
            ("Timeline".to_string(), timeline_name.to_string()),
        ],
        fields,
    })
}

fn service_label(code: &str) -> &'static str {
    match code {
        "screen-printing" => "Screen Printing",
        "embroidery" => "Embroidery",
        "dtg" => "Direct-to-Garment",
        "vinyl" => "Vinyl",
        _ => "Unknown",
    }
}

fn timeline_label(code: &str) -> &'static str {
    match code {
        "rush" => "Rush (under a week)",
        "1-2-weeks" => "1-2 weeks",
        "2-4-weeks" => "2-4 weeks",
        "flexible" => "Flexible",
        _ => "Unknown",
    }
}

fn confirmation_html(name: &str, service: &str, timeline: &str) -> String {
    format!(
        "<p>Hi {},</p>\
         <p>Thanks for your quote request for {} ({}). We will send you a \
         detailed quote within one business day.</p>\
         <p>&mdash; The Shop Team</p>",
        name, service, timeline
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    fn valid() -> Map<String, Value> {
        payload(json!({
            "name": "Ann",
            "email": "ann@x.com",
            "service": "embroidery",
            "timeline": "rush"
        }))
    }

    #[test]
    fn test_build_valid_quote() {
        let note = build(&valid()).unwrap();
        assert_eq!(note.form, "quote");
        assert_eq!(note.embed.title, "Quote Request");
        assert!(note.auto_reply.is_some());
        assert_eq!(
            note.admin_context,
            vec![
                ("Service".to_string(), "Embroidery".to_string()),
                ("Timeline".to_string(), "Rush (under a week)".to_string()),
            ]
        );
    }

    #[test]
    fn test_missing_timeline_rejected() {
        let mut map = valid();
        map.remove("timeline");
        let err = build(&map).unwrap_err();
        assert!(err.contains("timeline"));
    }

    #[test]
    fn test_invalid_service_enumerates_allowed_set() {
        let mut map = valid();
        map.insert("service".to_string(), json!("alchemy"));
        let err = build(&map).unwrap_err();
        assert!(err.contains("screen-printing"));
        assert!(err.contains("vinyl"));
    }

    #[test]
    fn test_quantity_coerces_silently() {
        let mut map = valid();
        map.insert("quantity".to_string(), json!("many"));
        let note = build(&map).unwrap();
        let quantity = note
            .embed
            .fields
            .iter()
            .find(|f| f.name == "Quantity")
            .unwrap();
        assert_eq!(quantity.value, "0");
    }

    #[test]
    fn test_quantity_absent_is_omitted() {
        let note = build(&valid()).unwrap();
        assert!(note.embed.fields.iter().all(|f| f.name != "Quantity"));
    }

    #[test]
    fn test_null_or_blank_quantity_is_omitted() {
        let mut map = valid();
        map.insert("quantity".to_string(), json!(null));
        let note = build(&map).unwrap();
        assert!(note.embed.fields.iter().all(|f| f.name != "Quantity"));

        map.insert("quantity".to_string(), json!("  "));
        let note = build(&map).unwrap();
        assert!(note.embed.fields.iter().all(|f| f.name != "Quantity"));
    }

    #[test]
    fn test_relay_variant_has_no_auto_reply() {
        let note = build_relay(&valid()).unwrap();
        assert_eq!(note.form, "quote-relay");
        assert_eq!(note.embed.title, "Quote Request (Webhook)");
        assert!(note.auto_reply.is_none());
    }
}
