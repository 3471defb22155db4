use crate::error::AppError;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static ALPHANUMEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]*$").expect("static regex"));
static ALPHA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z]*$").expect("static regex"));
static INT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[0-9]+$").expect("static regex"));
// Anything that looks like an opening or closing tag would be stripped as markup.
static MARKUP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?[a-zA-Z!?/][^>]*>").expect("static regex"));
static PLUGIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]*[a-z0-9]$").expect("static regex"));

/// Scalar text form of a parameter, or `InvalidParameter` for missing,
/// null and structured values.
fn scalar_text(field: &str, value: Option<&Value>) -> Result<String, AppError> {
    match value {
        None | Some(Value::Null) => Err(AppError::InvalidParameter(format!(
            "Missing required key in single structure: {}",
            field
        ))),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(AppError::InvalidParameter(format!(
            "{} => Invalid parameter value detected (expected a scalar, got {})",
            field, other
        ))),
    }
}

/// Same as `scalar_text` but absent or null values take `default`.
fn scalar_text_or(field: &str, value: Option<&Value>, default: &str) -> Result<String, AppError> {
    match value {
        None | Some(Value::Null) => Ok(default.to_string()),
        v => scalar_text(field, v),
    }
}

fn reject(field: &str, raw: &str, kind: &str) -> AppError {
    AppError::InvalidParameter(format!(
        "{} => Invalid parameter value detected ({:?} is not a valid {} value)",
        field, raw, kind
    ))
}

/// Integer parameter. Numeric strings are coerced only when they are already
/// in canonical form; fractions, padding and leading zeros are rejected.
pub fn clean_int(field: &str, value: Option<&Value>) -> Result<i64, AppError> {
    if let Some(Value::Number(n)) = value {
        return n.as_i64().ok_or_else(|| reject(field, &n.to_string(), "integer"));
    }
    let raw = scalar_text(field, value)?;
    if !INT_RE.is_match(&raw) {
        return Err(reject(field, &raw, "integer"));
    }
    match raw.parse::<i64>() {
        Ok(parsed) if parsed.to_string() == raw => Ok(parsed),
        _ => Err(reject(field, &raw, "integer")),
    }
}

/// Letters, digits, underscore and hyphen only.
pub fn clean_alphanumext(field: &str, value: Option<&Value>) -> Result<String, AppError> {
    let raw = scalar_text(field, value)?;
    check_alphanumext(field, raw)
}

pub fn clean_alphanumext_or(field: &str, value: Option<&Value>, default: &str) -> Result<String, AppError> {
    let raw = scalar_text_or(field, value, default)?;
    check_alphanumext(field, raw)
}

fn check_alphanumext(field: &str, raw: String) -> Result<String, AppError> {
    if ALPHANUMEXT_RE.is_match(&raw) {
        Ok(raw)
    } else {
        Err(reject(field, &raw, "alphanumext"))
    }
}

/// Letters only.
pub fn clean_alpha(field: &str, value: Option<&Value>) -> Result<String, AppError> {
    let raw = scalar_text(field, value)?;
    if ALPHA_RE.is_match(&raw) {
        Ok(raw)
    } else {
        Err(reject(field, &raw, "alpha"))
    }
}

/// Free text without markup.
pub fn clean_text_or(field: &str, value: Option<&Value>, default: &str) -> Result<String, AppError> {
    let raw = scalar_text_or(field, value, default)?;
    if MARKUP_RE.is_match(&raw) {
        Err(reject(field, &raw, "text"))
    } else {
        Ok(raw)
    }
}

/// Frankenstyle plugin name: lowercase, starts with a letter, no trailing
/// or doubled underscores.
pub fn is_valid_plugin_name(name: &str) -> bool {
    PLUGIN_RE.is_match(name) && !name.contains("__")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn int_accepts_numbers_and_numeric_strings() {
        assert_eq!(clean_int("id", Some(&json!(15))).unwrap(), 15);
        assert_eq!(clean_int("id", Some(&json!("42"))).unwrap(), 42);
        assert_eq!(clean_int("id", Some(&json!("-3"))).unwrap(), -3);
    }

    #[test]
    fn int_rejects_fractions_text_and_missing() {
        assert!(matches!(clean_int("id", Some(&json!(1.5))), Err(AppError::InvalidParameter(_))));
        assert!(matches!(clean_int("id", Some(&json!("12abc"))), Err(AppError::InvalidParameter(_))));
        assert!(matches!(clean_int("id", Some(&json!(true))), Err(AppError::InvalidParameter(_))));
        assert!(matches!(clean_int("id", None), Err(AppError::InvalidParameter(_))));
    }

    #[test]
    fn int_rejects_non_canonical_strings() {
        for raw in [" 015 ", "015", " 15", "15 ", "-0", "+15"] {
            assert!(
                matches!(clean_int("id", Some(&json!(raw))), Err(AppError::InvalidParameter(_))),
                "{:?} should be rejected",
                raw
            );
        }
    }

    #[test]
    fn alphanumext_allows_hyphen_and_underscore() {
        assert_eq!(clean_alphanumext("t", Some(&json!("course-view_topics2"))).unwrap(), "course-view_topics2");
        assert!(clean_alphanumext("t", Some(&json!("course view"))).is_err());
        assert!(clean_alphanumext("t", Some(&json!("course/view"))).is_err());
    }

    #[test]
    fn optional_fields_take_defaults() {
        assert_eq!(clean_alphanumext_or("h", None, "").unwrap(), "");
        assert_eq!(clean_alphanumext_or("h", Some(&Value::Null), "").unwrap(), "");
        assert_eq!(clean_text_or("s", None, "").unwrap(), "");
    }

    #[test]
    fn alpha_rejects_digits() {
        assert_eq!(clean_alpha("l", Some(&json!("incourse"))).unwrap(), "incourse");
        assert!(clean_alpha("l", Some(&json!("course2"))).is_err());
        assert!(clean_alpha("l", Some(&json!("my-index"))).is_err());
    }

    #[test]
    fn text_rejects_markup_only() {
        assert_eq!(clean_text_or("s", Some(&json!("page 2 & more")), "").unwrap(), "page 2 & more");
        assert_eq!(clean_text_or("s", Some(&json!("a < b")), "").unwrap(), "a < b");
        assert!(clean_text_or("s", Some(&json!("<b>bold</b>")), "").is_err());
    }

    #[test]
    fn plugin_names() {
        assert!(is_valid_plugin_name("html"));
        assert!(is_valid_plugin_name("calendar_month"));
        assert!(!is_valid_plugin_name("Html"));
        assert!(!is_valid_plugin_name("recent__activity"));
        assert!(!is_valid_plugin_name("tags_"));
        assert!(!is_valid_plugin_name("9lives"));
        assert!(!is_valid_plugin_name("x"));
    }
}
