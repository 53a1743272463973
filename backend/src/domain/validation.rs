//! Form validation shared by the entity services.
//!
//! Checks accumulate into a [`Validator`] so a single response carries every
//! field error at once.

use chrono::NaiveDate;
use shared::FieldError;

use super::error::{DomainError, DomainResult};

pub const MAX_EXPENSE: f64 = 999_999.99;
const MAX_PHONE_LEN: usize = 20;
const MAX_EMAIL_LEN: usize = 254;

/// Trim and collapse runs of internal whitespace to a single space
pub fn normalize_text(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize optional free text; blank input becomes `None`
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value.map(|v| normalize_text(&v)).filter(|v| !v.is_empty())
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Required text measured in characters after normalization
    pub fn text(&mut self, field: &str, label: &str, value: &str, min: usize, max: usize) {
        let len = value.chars().count();
        if len == 0 {
            self.push(field, format!("{} is required.", label));
        } else if len < min {
            self.push(field, format!("{} must have at least {} characters.", label, min));
        } else if len > max {
            self.push(field, format!("{} cannot exceed {} characters.", label, max));
        }
    }

    pub fn phone(&mut self, field: &str, value: Option<&str>) {
        let Some(phone) = value else { return };
        if phone.chars().count() > MAX_PHONE_LEN {
            self.push(field, format!("Phone cannot exceed {} characters.", MAX_PHONE_LEN));
        } else if !phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'))
        {
            self.push(field, "Phone may only contain digits, spaces and + - ( ).");
        }
    }

    pub fn email(&mut self, field: &str, value: Option<&str>) {
        let Some(email) = value else { return };
        if email.chars().count() > MAX_EMAIL_LEN {
            self.push(field, format!("Email cannot exceed {} characters.", MAX_EMAIL_LEN));
        } else if !looks_like_email(email) {
            self.push(field, "Enter a valid email address.");
        }
    }

    pub fn positive(&mut self, field: &str, label: &str, value: Option<f64>) {
        match value {
            None => self.push(field, format!("{} is required.", label)),
            Some(v) if !v.is_finite() || v <= 0.0 => {
                self.push(field, format!("{} must be greater than zero.", label))
            }
            Some(_) => {}
        }
    }

    pub fn required_id(&mut self, field: &str, label: &str, value: Option<i64>) {
        if value.is_none() {
            self.push(field, format!("Select a {}.", label));
        }
    }

    pub fn finish(self) -> DomainResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(self.errors))
        }
    }
}

fn looks_like_email(value: &str) -> bool {
    if value.contains(char::is_whitespace) {
        return false;
    }
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .map(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
                    .unwrap_or(false)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  Ana   María \t "), "Ana María");
        assert_eq!(normalize_optional(Some("   ".to_string())), None);
        assert_eq!(normalize_optional(Some(" hola ".to_string())), Some("hola".to_string()));
    }

    #[test]
    fn test_collects_every_error() {
        let mut v = Validator::new();
        v.text("first_name", "First name", "", 2, 100);
        v.text("last_name", "Last name", "L", 2, 100);
        v.phone("phone", Some("55-abc"));
        v.email("email", Some("not-an-email"));

        match v.finish() {
            Err(DomainError::Validation(errors)) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["first_name", "last_name", "phone", "email"]);
                assert_eq!(errors[0].message, "First name is required.");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_accepts_valid_contact_data() {
        let mut v = Validator::new();
        v.phone("phone", Some("+52 (55) 1234-5678"));
        v.email("email", Some("ana@colibri.mx"));
        v.positive("deposit", "Deposit", Some(100.0));
        assert!(v.finish().is_ok());
    }

    #[test]
    fn test_email_shapes() {
        assert!(looks_like_email("a@b.co"));
        assert!(!looks_like_email("a@b"));
        assert!(!looks_like_email("@b.co"));
        assert!(!looks_like_email("a b@c.co"));
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-02-29"), NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(parse_date("2023-02-29"), None);
        assert_eq!(parse_date("01/02/2024"), None);
    }
}
