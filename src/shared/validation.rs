//! Validation Utilities
//!
//! Field validators shared by the request DTOs, plus conversion from
//! `validator` errors to the application error type.

use once_cell::sync::Lazy;
use regex::Regex;
use validator::{ValidationError, ValidationErrors};

use super::error::{AppError, FieldError};

/// International phone numbers: a leading `+` followed by up to 15 digits.
/// Matches the database CHECK constraint on `users.phone_number`.
pub static PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+[0-9]{1,15}$").expect("valid phone regex"));

/// Characters accepted as the "special" class in passwords.
const PASSWORD_SPECIAL: &str = "#?!@$%^&*-";

/// Password policy: 8-14 characters with at least one uppercase letter,
/// one lowercase letter, one digit and one special character.
///
/// Expressed as a function because the character-class requirements would
/// need look-ahead groups, which the `regex` crate does not support.
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let length = password.chars().count();
    if !(8..=14).contains(&length) {
        return Err(password_error("Password must be 8-14 characters"));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(password_error("Password must contain an uppercase letter"));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(password_error("Password must contain a lowercase letter"));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(password_error("Password must contain a digit"));
    }
    if !password.chars().any(|c| PASSWORD_SPECIAL.contains(c)) {
        return Err(password_error(
            "Password must contain a special character (#?!@$%^&*-)",
        ));
    }
    Ok(())
}

fn password_error(message: &'static str) -> ValidationError {
    let mut error = ValidationError::new("password_strength");
    error.message = Some(message.into());
    error
}

/// Convert validation errors to AppError
pub fn validation_error(errors: ValidationErrors) -> AppError {
    let field_errors: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| FieldError {
                field: field.to_string(),
                message: e.message.clone().map(|m| m.to_string()).unwrap_or_default(),
            })
        })
        .collect();

    let message = field_errors
        .first()
        .map(|e| format!("{}: {}", e.field, e.message))
        .unwrap_or_else(|| "Validation failed".into());

    AppError::Validation(message)
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("Hk7pH9*35Fu&3U", true; "full policy")]
    #[test_case("Abcdef1!", true; "minimum length")]
    #[test_case("abcdef1!", false; "missing uppercase")]
    #[test_case("ABCDEF1!", false; "missing lowercase")]
    #[test_case("Abcdefg!", false; "missing digit")]
    #[test_case("Abcdefg1", false; "missing special")]
    #[test_case("Ab1!", false; "too short")]
    #[test_case("Abcdefghijkl1!e", false; "too long")]
    fn test_password_strength(password: &str, valid: bool) {
        assert_eq!(validate_password_strength(password).is_ok(), valid);
    }

    #[test_case("+593987654321", true; "ecuador number")]
    #[test_case("+1", true; "single digit")]
    #[test_case("+123456789012345", true; "fifteen digits")]
    #[test_case("+1234567890123456", false; "sixteen digits")]
    #[test_case("593987654321", false; "missing plus")]
    #[test_case("+59 398", false; "contains space")]
    fn test_phone_regex(phone: &str, valid: bool) {
        assert_eq!(PHONE_REGEX.is_match(phone), valid);
    }
}
