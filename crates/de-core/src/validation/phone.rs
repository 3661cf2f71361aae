//! Phone number validation.
//!
//! Numbers are normalized to E.164 (`+` followed by 8 to 15 digits). Spaces,
//! dashes, dots and parentheses are stripped first. A bare national number of
//! exactly ten digits can be accepted with a caller-supplied country code.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

static E164: OnceLock<Regex> = OnceLock::new();

fn e164() -> &'static Regex {
    E164.get_or_init(|| Regex::new(r"^\+[1-9][0-9]{7,14}$").expect("static regex is valid"))
}

/// Errors that can occur during phone validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneValidationError {
    #[error("Phone number is empty")]
    Empty,

    #[error("Phone number '{0}' is not in international format (+<country><number>)")]
    InvalidFormat(String),

    #[error("Invalid country code: '{0}'")]
    InvalidCountryCode(String),
}

/// A validated E.164 phone number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ValidatedPhone(String);

impl ValidatedPhone {
    /// Validates a number that must already carry a `+` country prefix.
    pub fn new(input: &str) -> Result<Self, PhoneValidationError> {
        Self::with_default_country(input, None)
    }

    /// Validates a number, prefixing `country_code` to bare ten-digit numbers.
    ///
    /// ```
    /// use de_core::validation::ValidatedPhone;
    ///
    /// let phone = ValidatedPhone::with_default_country("98765 43210", Some("91")).unwrap();
    /// assert_eq!(phone.as_str(), "+919876543210");
    /// ```
    pub fn with_default_country(
        input: &str,
        country_code: Option<&str>,
    ) -> Result<Self, PhoneValidationError> {
        let compact: String = input
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
            .collect();

        if compact.is_empty() {
            return Err(PhoneValidationError::Empty);
        }

        let candidate = if compact.starts_with('+') {
            compact
        } else if let Some(digits) = compact.strip_prefix("00") {
            format!("+{}", digits)
        } else if compact.len() == 10 && compact.chars().all(|c| c.is_ascii_digit()) {
            match country_code {
                Some(code) => {
                    let code = code.trim_start_matches('+');
                    if code.is_empty()
                        || code.len() > 3
                        || !code.chars().all(|c| c.is_ascii_digit())
                    {
                        return Err(PhoneValidationError::InvalidCountryCode(code.to_string()));
                    }
                    format!("+{}{}", code, compact)
                }
                None => return Err(PhoneValidationError::InvalidFormat(input.to_string())),
            }
        } else {
            return Err(PhoneValidationError::InvalidFormat(input.to_string()));
        };

        if !e164().is_match(&candidate) {
            return Err(PhoneValidationError::InvalidFormat(input.to_string()));
        }
        Ok(Self(candidate))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Digits without the leading `+`, as some SMS gateways expect.
    pub fn digits(&self) -> &str {
        &self.0[1..]
    }

    /// The last ten digits, i.e. the national number for +91 numbers.
    pub fn national_number(&self) -> &str {
        let digits = self.digits();
        &digits[digits.len().saturating_sub(10)..]
    }

    /// Masks all but the last four digits.
    pub fn masked(&self) -> String {
        let digits = self.digits();
        let visible = &digits[digits.len().saturating_sub(4)..];
        format!("+{}{}", "*".repeat(digits.len() - visible.len()), visible)
    }
}

impl fmt::Display for ValidatedPhone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ValidatedPhone {
    type Error = PhoneValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ValidatedPhone::new(&value)
    }
}

impl From<ValidatedPhone> for String {
    fn from(phone: ValidatedPhone) -> String {
        phone.0
    }
}

/// Validates a phone number in international format.
pub fn validate_phone(phone: &str) -> Result<ValidatedPhone, PhoneValidationError> {
    ValidatedPhone::new(phone)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_international() {
        let phone = ValidatedPhone::new("+1 (415) 555-2671").unwrap();
        assert_eq!(phone.as_str(), "+14155552671");
        assert_eq!(phone.digits(), "14155552671");
        assert!(ValidatedPhone::new("0044 20 7946 0958").is_ok());
    }

    #[test]
    fn test_rejects_malformed() {
        assert_eq!(ValidatedPhone::new(""), Err(PhoneValidationError::Empty));
        for bad in ["12345", "+0123456789", "+12ab456789", "phone", "+1234567"] {
            assert!(
                matches!(
                    ValidatedPhone::new(bad),
                    Err(PhoneValidationError::InvalidFormat(_))
                ),
                "{}",
                bad
            );
        }
        assert!(ValidatedPhone::new("+1234567890123456").is_err());
    }

    #[test]
    fn test_default_country() {
        assert!(ValidatedPhone::new("9876543210").is_err());
        let phone = ValidatedPhone::with_default_country("9876543210", Some("+91")).unwrap();
        assert_eq!(phone.as_str(), "+919876543210");
        assert_eq!(phone.national_number(), "9876543210");
        assert_eq!(
            ValidatedPhone::with_default_country("9876543210", Some("9x")),
            Err(PhoneValidationError::InvalidCountryCode("9x".to_string()))
        );
    }

    #[test]
    fn test_masked() {
        let phone = ValidatedPhone::new("+919876543210").unwrap();
        assert_eq!(phone.masked(), "+********3210");
    }
}
