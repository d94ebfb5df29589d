use std::sync::OnceLock;

use regex::Regex;

use crate::error::{AppError, AppResult};

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?)+$",
        )
        .expect("email pattern compiles")
    })
}

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\+?[0-9][0-9 \-]{6,18}[0-9]$").expect("phone pattern compiles"))
}

pub fn is_valid_email(email: &str) -> bool {
    email_pattern().is_match(email)
}

pub fn is_valid_phone(phone: &str) -> bool {
    phone_pattern().is_match(phone.trim())
}

/// Lowercase, ASCII alphanumerics separated by single dashes.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty() && slugify(slug) == slug
}

/// Uses the explicit slug when given, else derives one from `fallback`.
pub fn resolve_slug(explicit: Option<&str>, fallback: &str) -> AppResult<String> {
    let slug = match explicit.map(str::trim).filter(|s| !s.is_empty()) {
        Some(given) if is_valid_slug(given) => given.to_string(),
        Some(given) => {
            return Err(AppError::Validation(format!(
                "Slug '{}' may only contain lowercase letters, digits and dashes",
                given
            )))
        }
        None => slugify(fallback),
    };

    if slug.is_empty() {
        return Err(AppError::Validation(
            "A slug could not be derived; please provide one".to_string(),
        ));
    }
    Ok(slug)
}

pub fn require_text(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        Err(AppError::Validation(format!("{} is required", field)))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails() {
        assert!(is_valid_email("pilgrim@example.com"));
        assert!(is_valid_email("first.last+tag@mail.example.sa"));
        assert!(!is_valid_email("invalid-email"));
        assert!(!is_valid_email("no-tld@example"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn phones() {
        assert!(is_valid_phone("+966 50 123 4567"));
        assert!(is_valid_phone("0501234567"));
        assert!(!is_valid_phone("call me"));
        assert!(!is_valid_phone("123"));
    }

    #[test]
    fn slugs() {
        assert_eq!(slugify("Jeddah Airport → Makkah Hotel"), "jeddah-airport-makkah-hotel");
        assert_eq!(slugify("  Ziyarat  Tour (Madinah) "), "ziyarat-tour-madinah");
        assert_eq!(slugify("مكة"), "");
        assert!(is_valid_slug("makkah-madinah"));
        assert!(!is_valid_slug("Makkah Madinah"));
    }

    #[test]
    fn resolve_slug_prefers_explicit() {
        assert_eq!(resolve_slug(Some("custom"), "Title").unwrap(), "custom");
        assert_eq!(resolve_slug(None, "Umrah Guide 2026").unwrap(), "umrah-guide-2026");
        assert_eq!(resolve_slug(Some("  "), "Taif").unwrap(), "taif");
        assert!(resolve_slug(Some("Bad Slug"), "x").is_err());
        assert!(resolve_slug(None, "مكة").is_err());
    }
}
