//! Per-field validation for registration input.

use regex::Regex;
use serde::Serialize;
use utoipa::ToSchema;

use super::service::RegisterRequest;

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 50;
pub const PASSWORD_MIN: usize = 8;
pub const FULL_NAME_MIN: usize = 2;
pub const FULL_NAME_MAX: usize = 100;

/// A single field that failed validation, with a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Normalize an email for lookup/uniqueness checks.
pub(super) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
pub(super) fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email_normalized))
}

fn valid_username(username: &str) -> bool {
    Regex::new(r"^[a-zA-Z0-9._-]+$").is_ok_and(|re| re.is_match(username))
}

fn valid_phone(phone: &str) -> bool {
    Regex::new(r"^\d{3}-\d{3}-\d{4}$").is_ok_and(|re| re.is_match(phone))
}

/// Password strength: at least one lowercase, uppercase, digit, and special
/// character from `@$!%*?&`, drawn only from that alphabet.
fn valid_password(password: &str) -> bool {
    const SPECIAL: &str = "@$!%*?&";
    password.len() >= PASSWORD_MIN
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| SPECIAL.contains(c))
        && password
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || SPECIAL.contains(c))
}

/// Check every registration field and collect all failures, not just the
/// first, so callers can report them per-field.
pub(super) fn validate_registration(request: &RegisterRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();

    let username_len = request.username.chars().count();
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&username_len) {
        errors.push(FieldError::new(
            "username",
            format!("must be between {USERNAME_MIN} and {USERNAME_MAX} characters"),
        ));
    } else if !valid_username(&request.username) {
        errors.push(FieldError::new(
            "username",
            "may only contain letters, numbers, dots, underscores, and hyphens",
        ));
    }

    if !valid_password(&request.password) {
        errors.push(FieldError::new(
            "password",
            format!(
                "must be at least {PASSWORD_MIN} characters with one uppercase letter, one lowercase letter, one number, and one special character"
            ),
        ));
    }

    let full_name_len = request.full_name.trim().chars().count();
    if !(FULL_NAME_MIN..=FULL_NAME_MAX).contains(&full_name_len) {
        errors.push(FieldError::new(
            "fullName",
            format!("must be between {FULL_NAME_MIN} and {FULL_NAME_MAX} characters"),
        ));
    }

    if !valid_email(&normalize_email(&request.email)) {
        errors.push(FieldError::new("email", "invalid email format"));
    }

    if let Some(phone) = &request.phone {
        if !valid_phone(phone) {
            errors.push(FieldError::new("phone", "must be in format: 518-555-0100"));
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RegisterRequest {
        RegisterRequest {
            username: "alice".to_string(),
            password: "Str0ng!Pw".to_string(),
            full_name: "Alice Smith".to_string(),
            email: "a@x.com".to_string(),
            phone: None,
        }
    }

    #[test]
    fn accepts_a_valid_request() {
        assert!(validate_registration(&request()).is_empty());
    }

    #[test]
    fn accepts_optional_phone_in_expected_format() {
        let mut req = request();
        req.phone = Some("518-555-0100".to_string());
        assert!(validate_registration(&req).is_empty());
    }

    #[test]
    fn rejects_malformed_phone() {
        let mut req = request();
        req.phone = Some("5185550100".to_string());
        let errors = validate_registration(&req);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "phone");
    }

    #[test]
    fn username_bounds_and_charset() {
        let mut req = request();
        req.username = "ab".to_string();
        assert_eq!(validate_registration(&req)[0].field, "username");

        req.username = "a".repeat(51);
        assert_eq!(validate_registration(&req)[0].field, "username");

        req.username = "bad name!".to_string();
        assert_eq!(validate_registration(&req)[0].field, "username");

        req.username = "good.name_42-x".to_string();
        assert!(validate_registration(&req).is_empty());
    }

    #[test]
    fn password_strength_rules() {
        for weak in [
            "short1!",     // too short
            "alllower1!",  // no uppercase
            "ALLUPPER1!",  // no lowercase
            "NoDigits!!",  // no digit
            "NoSpecial99", // no special character
            "Sp ace!1aA",  // whitespace outside the alphabet
        ] {
            let mut req = request();
            req.password = weak.to_string();
            let errors = validate_registration(&req);
            assert_eq!(errors.len(), 1, "expected rejection for {weak:?}");
            assert_eq!(errors[0].field, "password");
        }
    }

    #[test]
    fn collects_all_failures_not_just_the_first() {
        let req = RegisterRequest {
            username: "x".to_string(),
            password: "weak".to_string(),
            full_name: String::new(),
            email: "not-an-email".to_string(),
            phone: Some("123".to_string()),
        };
        let errors = validate_registration(&req);
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["username", "password", "fullName", "email", "phone"]
        );
    }

    #[test]
    fn email_is_normalized_before_checking() {
        let mut req = request();
        req.email = " Alice@Example.COM ".to_string();
        assert!(validate_registration(&req).is_empty());
        assert_eq!(normalize_email(&req.email), "alice@example.com");
    }
}
