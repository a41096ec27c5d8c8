use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{PasswordRule, ValidationError};

const MIN_PASSWORD_CHARS: usize = 8;
const FULL_NAME_CHARS: std::ops::RangeInclusive<usize> = 3..=30;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Reports the first rule the password breaks.
pub fn check_password_strength(password: &str) -> Result<(), ValidationError> {
    let rule = if password.chars().count() < MIN_PASSWORD_CHARS {
        Some(PasswordRule::TooShort)
    } else if password.contains("password") {
        Some(PasswordRule::ContainsPassword)
    } else if !password.chars().any(|c| c.is_ascii_lowercase()) {
        Some(PasswordRule::MissingLowercase)
    } else if !password.chars().any(|c| c.is_ascii_uppercase()) {
        Some(PasswordRule::MissingUppercase)
    } else if !password.chars().any(|c| c.is_ascii_digit()) {
        Some(PasswordRule::MissingDigit)
    } else if !password.chars().any(|c| c.is_ascii_punctuation()) {
        Some(PasswordRule::MissingSpecial)
    } else {
        None
    };
    match rule {
        Some(rule) => Err(ValidationError::Password(rule)),
        None => Ok(()),
    }
}

/// Trims and length-checks a full name.
pub fn check_full_name(full_name: &str) -> Result<String, ValidationError> {
    let trimmed = full_name.trim();
    if !FULL_NAME_CHARS.contains(&trimmed.chars().count()) {
        return Err(ValidationError::field(
            "full_name",
            "must be between 3 and 30 characters",
        ));
    }
    Ok(trimmed.to_string())
}

pub fn check_email(email: &str) -> Result<String, ValidationError> {
    let email = normalize_email(email);
    if !is_valid_email(&email) {
        return Err(ValidationError::field("email", "is not a valid email address"));
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn broken_rule(password: &str) -> Option<PasswordRule> {
        match check_password_strength(password) {
            Ok(()) => None,
            Err(ValidationError::Password(rule)) => Some(rule),
            Err(other) => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn accepts_password_with_every_class() {
        assert_eq!(broken_rule("Abc123!@"), None);
        assert_eq!(broken_rule("Tr0ub4dor&3"), None);
    }

    #[test]
    fn reports_first_unmet_rule() {
        assert_eq!(broken_rule("abc12345"), Some(PasswordRule::MissingUppercase));
        assert_eq!(broken_rule("Ab1!"), Some(PasswordRule::TooShort));
        assert_eq!(broken_rule("Mypassword1!"), Some(PasswordRule::ContainsPassword));
        assert_eq!(broken_rule("ABC12345!"), Some(PasswordRule::MissingLowercase));
        assert_eq!(broken_rule("Abcdefgh!"), Some(PasswordRule::MissingDigit));
        assert_eq!(broken_rule("Abcdefg1"), Some(PasswordRule::MissingSpecial));
    }

    #[test]
    fn password_substring_check_is_case_sensitive() {
        assert_eq!(broken_rule("MyPassword1!"), None);
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        assert_eq!(broken_rule("Äb1!"), Some(PasswordRule::TooShort));
        assert_eq!(broken_rule("Äbcdé1!X"), None);
    }

    #[test]
    fn case_classes_are_ascii_only() {
        assert_eq!(broken_rule("éBCDEFG1!"), Some(PasswordRule::MissingLowercase));
        assert_eq!(broken_rule("Ébcdefg1!"), Some(PasswordRule::MissingUppercase));
    }

    #[test]
    fn full_name_is_trimmed_and_bounded() {
        assert_eq!(check_full_name("  Jane Doe ").unwrap(), "Jane Doe");
        assert!(check_full_name("Jo").is_err());
        assert!(check_full_name("   Jo   ").is_err());
        assert!(check_full_name(&"x".repeat(31)).is_err());
        assert!(check_full_name(&"x".repeat(30)).is_ok());
    }

    #[test]
    fn email_is_normalized_and_checked() {
        assert_eq!(check_email("  Jane@Example.COM ").unwrap(), "jane@example.com");
        assert!(check_email("not-an-email").is_err());
        assert!(check_email("a@b").is_err());
        assert!(check_email("a b@c.d").is_err());
    }
}
