//! Order webhook relay: validation, enum set, and embed.
//!
//! Orders arrive from the storefront over the signed webhook endpoint
//! and are relayed to chat only; there is no customer-facing
//! confirmation on this path.

use serde_json::{Map, Value};

use super::{optional_field, require_fields, str_field};
use crate::notify::discord::{Embed, EmbedField};
use crate::notify::Notification;
use crate::sanitize::{sanitize_email, sanitize_string, validate_enum};

pub const REQUIRED_FIELDS: &[&str] =
    &["order_id", "customer_name", "customer_email", "order_type"];

pub const ALLOWED_ORDER_TYPES: &[&str] = &["retail", "wholesale", "sample"];

const EMBED_COLOR: u32 = 0xe67e22;

/// Validate and sanitize an order relay payload.
pub fn build(payload: &Map<String, Value>) -> Result<Notification, String> {
    require_fields(payload, REQUIRED_FIELDS)?;

    let order_type = sanitize_string(str_field(payload, "order_type"));
    validate_enum("order_type", &order_type, ALLOWED_ORDER_TYPES)?;

    let order_id = sanitize_string(str_field(payload, "order_id"));
    let customer_name = sanitize_string(str_field(payload, "customer_name"));
    let customer_email = sanitize_email(str_field(payload, "customer_email"));
    let items = optional_field(payload, "items");
    let total = optional_field(payload, "total");
    let notes = optional_field(payload, "notes");

    let mut embed_fields = vec![
        EmbedField::new("Order ID", order_id.clone(), true),
        EmbedField::new("Type", order_type_label(&order_type), true),
        EmbedField::new("Customer", customer_name.clone(), true),
        EmbedField::new("Email", customer_email.clone(), true),
    ];
    if let Some(total) = &total {
        embed_fields.push(EmbedField::new("Total", total.clone(), true));
    }
    if let Some(items) = &items {
        embed_fields.push(EmbedField::new("Items", items.clone(), false));
    }
    if let Some(notes) = &notes {
        embed_fields.push(EmbedField::new("Notes", notes.clone(), false));
    }

    let mut fields = vec![
        ("Order ID".to_string(), order_id),
        ("Type".to_string(), order_type.clone()),
        ("Customer".to_string(), customer_name),
        ("Email".to_string(), customer_email),
    ];
    if let Some(total) = &total {
        fields.push(("Total".to_string(), total.clone()));
    }
    if let Some(items) = &items {
        fields.push(("Items".to_string(), items.clone()));
    }
    if let Some(notes) = &notes {
        fields.push(("Notes".to_string(), notes.clone()));
    }

    Ok(Notification {
        form: "order",
        webhook_url: None,
        embed: Embed::new("New Order Received", EMBED_COLOR, embed_fields),
        auto_reply: None,
        admin_context: vec![(
            "Order Type".to_string(),
            order_type_label(&order_type).to_string(),
        )],
        fields,
    })
}

fn order_type_label(code: &str) -> &'static str {
    match code {
        "retail" => "Retail",
        "wholesale" => "Wholesale",
        "sample" => "Sample",
        _ => "Unknown",
    }
}
