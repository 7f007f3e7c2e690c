//! Field sanitization and validation primitives.
//!
//! Pure, stateless functions applied per field. Nothing here performs
//! I/O or touches shared state; every submission value passes through
//! these before reaching a downstream channel.

use serde_json::{Map, Value};

/// Maximum length of a free-text field after trimming.
const MAX_STRING_CHARS: usize = 1000;

/// Maximum length of an email address (RFC 5321 limit).
const MAX_EMAIL_CHARS: usize = 254;

/// Maximum length of a phone number after stripping.
const MAX_PHONE_CHARS: usize = 20;

/// Keywords that route a contact message to the FAQ confirmation
/// template. Matching is case-insensitive substring; used only to
/// select a template variant, never to reject.
const FAQ_KEYWORDS: &[&str] = &[
    "hours",
    "opening",
    "shipping",
    "delivery",
    "price",
    "pricing",
    "cost",
    "file format",
    "artwork format",
    "quantity",
    "minimum order",
];

/// Sanitize a free-text field: trim, truncate to 1000 characters, then
/// HTML-escape `& < > " '`. Ampersand is escaped first so entities
/// introduced by the later substitutions are not double-escaped.
///
/// Empty or absent input yields an empty string; this never fails.
pub fn sanitize_string(input: &str) -> String {
    let truncated: String = input.trim().chars().take(MAX_STRING_CHARS).collect();
    truncated
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Sanitize an email address: trim, lowercase, truncate to 254
/// characters, then check the permissive `local@domain.tld` shape.
///
/// A value failing the shape check yields an empty string. That is
/// "treated as absent" rather than an error here; the required-field
/// check against the original payload happens in the form builders.
pub fn sanitize_email(input: &str) -> String {
    let email: String = input
        .trim()
        .to_lowercase()
        .chars()
        .take(MAX_EMAIL_CHARS)
        .collect();

    if is_plausible_email(&email) {
        email
    } else {
        String::new()
    }
}

/// Permissive email shape: one or more non-space non-@ characters, a
/// single `@`, then a domain containing a dot with at least one
/// character on each side. Deliberately not RFC 5322; the goal is
/// rejecting obvious garbage, not full address parsing.
fn is_plausible_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    let chars: Vec<char> = domain.chars().collect();
    chars.len() >= 3 && chars[1..chars.len() - 1].contains(&'.')
}

/// Sanitize a phone number: keep only digits and `+ - ( )` and spaces,
/// truncate to 20 characters.
pub fn sanitize_phone(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | ' '))
        .take(MAX_PHONE_CHARS)
        .collect()
}

/// Coerce a quantity value to an integer. Non-numeric input coerces
/// silently to 0; malformed quantity is never a rejection reason.
pub fn coerce_quantity(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n.as_i64().unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// Collect the names of required fields that are missing from the
/// original (pre-sanitize) payload. A field is missing when absent,
/// null, or an empty string. All missing names are reported together
/// so the caller can aggregate them into one error.
pub fn missing_fields(payload: &Map<String, Value>, required: &[&str]) -> Vec<String> {
    required
        .iter()
        .filter(|name| match payload.get(**name) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.is_empty(),
            Some(_) => false,
        })
        .map(|name| name.to_string())
        .collect()
}

/// Check that `value` is a member of the allowed set for `field`.
/// The error message enumerates the set.
pub fn validate_enum(field: &str, value: &str, allowed: &[&str]) -> Result<(), String> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(format!(
            "Invalid {}: must be one of {}",
            field,
            allowed.join(", ")
        ))
    }
}

/// Detect whether a contact message looks like a frequently asked
/// question (hours, shipping, pricing, file formats, quantities).
pub fn detect_faq(message: &str) -> bool {
    let lower = message.to_lowercase();
    FAQ_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sanitize_string_escapes_metacharacters() {
        let out = sanitize_string("<script>alert(\"x\") & 'y'</script>");
        assert!(!out.contains('<'));
        assert!(!out.contains('>'));
        assert!(!out.contains('"'));
        assert!(!out.contains('\''));
        assert_eq!(
            out,
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#x27;y&#x27;&lt;/script&gt;"
        );
    }

    #[test]
    fn test_sanitize_string_ampersand_first() {
        // A pre-existing entity must not be double-escaped into &amp;lt;
        // by escaping < before &.
        assert_eq!(sanitize_string("&lt;"), "&amp;lt;");
    }

    #[test]
    fn test_sanitize_string_trims_and_truncates() {
        assert_eq!(sanitize_string("  hello  "), "hello");
        let long = "a".repeat(5000);
        assert_eq!(sanitize_string(&long).len(), 1000);
    }

    #[test]
    fn test_sanitize_string_empty() {
        assert_eq!(sanitize_string(""), "");
        assert_eq!(sanitize_string("   "), "");
    }

    #[test]
    fn test_sanitize_email_normalizes() {
        assert_eq!(sanitize_email("Foo@BAR.com  "), "foo@bar.com");
    }

    #[test]
    fn test_sanitize_email_rejects_garbage() {
        assert_eq!(sanitize_email("not-an-email"), "");
        assert_eq!(sanitize_email("a@b"), "");
        assert_eq!(sanitize_email("@b.com"), "");
        assert_eq!(sanitize_email("a@.com"), "");
        assert_eq!(sanitize_email("a@b."), "");
        assert_eq!(sanitize_email("a b@c.com"), "");
        assert_eq!(sanitize_email("a@b@c.com"), "");
    }

    #[test]
    fn test_sanitize_phone_strips_letters() {
        assert_eq!(sanitize_phone("+1 (555) 123-4567 ext9"), "+1 (555) 123-4567 9");
        assert_eq!(sanitize_phone("call me"), " ");
    }

    #[test]
    fn test_coerce_quantity() {
        assert_eq!(coerce_quantity(&json!(42)), 42);
        assert_eq!(coerce_quantity(&json!("17")), 17);
        assert_eq!(coerce_quantity(&json!("a lot")), 0);
        assert_eq!(coerce_quantity(&json!(null)), 0);
        assert_eq!(coerce_quantity(&json!(true)), 0);
    }

    #[test]
    fn test_missing_fields_aggregates() {
        let payload = json!({"name": "Ann", "email": "", "extra": 1});
        let map = payload.as_object().unwrap();
        let missing = missing_fields(map, &["name", "email", "message"]);
        assert_eq!(missing, vec!["email".to_string(), "message".to_string()]);
    }

    #[test]
    fn test_missing_fields_null_counts_as_missing() {
        let payload = json!({"name": null});
        let map = payload.as_object().unwrap();
        assert_eq!(missing_fields(map, &["name"]), vec!["name".to_string()]);
    }

    #[test]
    fn test_validate_enum() {
        assert!(validate_enum("service", "embroidery", &["embroidery", "dtg"]).is_ok());
        let err = validate_enum("service", "magic", &["embroidery", "dtg"]).unwrap_err();
        assert!(err.contains("embroidery, dtg"));
    }

    #[test]
    fn test_detect_faq() {
        assert!(detect_faq("What are your HOURS on Saturday?"));
        assert!(detect_faq("how much does shipping cost"));
        assert!(!detect_faq("I love your work"));
    }
}
