//! Lenient input cleaning. Over-long text is truncated and bad numbers become
//! zero; neither is an error.

use serde_json::Value;

/// Trims `value` and keeps at most `max` characters. `None` becomes `""`.
pub fn clamp_text(value: Option<&str>, max: usize) -> String {
    let trimmed = value.unwrap_or_default().trim();
    match trimmed.char_indices().nth(max) {
        Some((cut, _)) => trimmed[..cut].to_string(),
        None => trimmed.to_string(),
    }
}

/// Parse-or-default for numeric fields.
///
/// Numbers pass through, strings are parsed after trimming (empty is zero),
/// `true` is one. Everything else, and any non-finite result, is zero.
pub fn parse_number_or_zero(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                s.parse::<f64>().unwrap_or(0.0)
            }
        }
        Value::Bool(true) => 1.0,
        _ => 0.0,
    };

    if parsed.is_finite() {
        parsed
    } else {
        0.0
    }
}

/// Distance in whole kilometres; negative input is zero.
pub fn parse_km(value: &Value) -> i64 {
    let km = parse_number_or_zero(value);
    if km <= 0.0 {
        0
    } else {
        km.floor() as i64
    }
}

pub fn normalize_email(value: Option<&str>) -> String {
    value.unwrap_or_default().trim().to_lowercase()
}

/// Keeps absolute http(s) URLs up to 400 characters; anything else is
/// dropped.
pub fn clean_avatar_url(value: Option<&str>) -> Option<String> {
    let url = clamp_text(value, 400);
    let scheme_len = ["http://", "https://"]
        .iter()
        .find(|scheme| {
            url.get(..scheme.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
        })
        .map(|scheme| scheme.len())?;

    let host = url[scheme_len..]
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    (!host.is_empty()).then_some(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clamp_text() {
        assert_eq!(clamp_text(Some("  Tula  "), 80), "Tula");
        assert_eq!(clamp_text(None, 80), "");
        assert_eq!(clamp_text(Some("abcdef"), 3), "abc");
        // counts characters, not bytes
        assert_eq!(clamp_text(Some("Москва"), 3), "Мос");
        assert_eq!(clamp_text(Some("Тула"), 4), "Тула");
    }

    #[test]
    fn test_parse_number_or_zero() {
        assert_eq!(parse_number_or_zero(&json!(200)), 200.0);
        assert_eq!(parse_number_or_zero(&json!(4.5)), 4.5);
        assert_eq!(parse_number_or_zero(&json!(" 12 ")), 12.0);
        assert_eq!(parse_number_or_zero(&json!("")), 0.0);
        assert_eq!(parse_number_or_zero(&json!("abc")), 0.0);
        assert_eq!(parse_number_or_zero(&json!("NaN")), 0.0);
        assert_eq!(parse_number_or_zero(&json!("inf")), 0.0);
        assert_eq!(parse_number_or_zero(&json!(true)), 1.0);
        assert_eq!(parse_number_or_zero(&json!(null)), 0.0);
        assert_eq!(parse_number_or_zero(&json!([1])), 0.0);
    }

    #[test]
    fn test_parse_km() {
        assert_eq!(parse_km(&json!(200)), 200);
        assert_eq!(parse_km(&json!("200.9")), 200);
        assert_eq!(parse_km(&json!(-5)), 0);
        assert_eq!(parse_km(&json!("far")), 0);
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email(Some("  Anna@X.com ")), "anna@x.com");
        assert_eq!(normalize_email(None), "");
    }

    #[test]
    fn test_clean_avatar_url() {
        assert_eq!(
            clean_avatar_url(Some(" https://cdn.x.com/a.png ")),
            Some("https://cdn.x.com/a.png".to_string())
        );
        assert_eq!(clean_avatar_url(Some("/local/a.png")), None);
        assert_eq!(clean_avatar_url(Some("")), None);
        assert_eq!(clean_avatar_url(None), None);

        assert_eq!(clean_avatar_url(Some("http://a")), Some("http://a".to_string()));
        assert_eq!(
            clean_avatar_url(Some("HTTPS://Cdn.x.com")),
            Some("HTTPS://Cdn.x.com".to_string())
        );
        assert_eq!(clean_avatar_url(Some("https://")), None);
        assert_eq!(clean_avatar_url(Some("https:///a.png")), None);
        assert_eq!(clean_avatar_url(Some("http://?x=1")), None);
        assert_eq!(clean_avatar_url(Some("ftp://x.com/a.png")), None);

        let long = format!("https://x.com/{}", "a".repeat(500));
        assert_eq!(clean_avatar_url(Some(&long)).map(|u| u.chars().count()), Some(400));
    }
}
