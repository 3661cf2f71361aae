//! Email address validation.
//!
//! Applies the RFC 5321 length limits and a conservative character set. The
//! validated address is trimmed and lowercased, so two registrations that
//! differ only in case compare equal.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const MAX_EMAIL_LENGTH: usize = 254;
const MAX_LOCAL_PART_LENGTH: usize = 64;
const MAX_LABEL_LENGTH: usize = 63;

/// Errors that can occur during email validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailValidationError {
    #[error("Email address is empty")]
    Empty,

    #[error("Email address exceeds maximum length of {MAX_EMAIL_LENGTH} characters")]
    TooLong,

    #[error("Email address missing '@' symbol")]
    MissingAtSymbol,

    #[error("Email address contains multiple '@' symbols")]
    MultipleAtSymbols,

    #[error("Local part (before @) is empty")]
    EmptyLocalPart,

    #[error("Local part exceeds maximum length of {MAX_LOCAL_PART_LENGTH} characters")]
    LocalPartTooLong,

    #[error("Domain part (after @) is empty")]
    EmptyDomain,

    #[error("Invalid character in local part: '{0}'")]
    InvalidLocalPartChar(char),

    #[error("Invalid character in domain: '{0}'")]
    InvalidDomainChar(char),

    #[error("Domain must contain at least one dot")]
    DomainMissingDot,

    #[error("Malformed domain label: '{0}'")]
    InvalidDomainLabel(String),

    #[error("Local part has a misplaced dot")]
    InvalidLocalDot,
}

/// A validated, lowercased email address.
///
/// ```
/// use de_core::validation::ValidatedEmail;
///
/// let email = ValidatedEmail::new(" Pilot@Example.COM ").unwrap();
/// assert_eq!(email.as_str(), "pilot@example.com");
/// assert_eq!(email.domain(), "example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ValidatedEmail {
    email: String,
    at_index: usize,
}

impl ValidatedEmail {
    pub fn new(email: &str) -> Result<Self, EmailValidationError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(EmailValidationError::Empty);
        }
        if email.len() > MAX_EMAIL_LENGTH {
            return Err(EmailValidationError::TooLong);
        }

        let at_index = match email.match_indices('@').count() {
            0 => return Err(EmailValidationError::MissingAtSymbol),
            1 => email.find('@').unwrap_or_default(),
            _ => return Err(EmailValidationError::MultipleAtSymbols),
        };

        check_local_part(&email[..at_index])?;
        check_domain(&email[at_index + 1..])?;

        Ok(Self {
            email: email.to_lowercase(),
            at_index,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.email
    }

    pub fn local_part(&self) -> &str {
        &self.email[..self.at_index]
    }

    pub fn domain(&self) -> &str {
        &self.email[self.at_index + 1..]
    }

    /// Masks the local part for display, e.g. `j***@example.com`.
    pub fn masked(&self) -> String {
        let local = self.local_part();
        let first: String = local.chars().take(1).collect();
        format!("{}***@{}", first, self.domain())
    }
}

fn check_local_part(local: &str) -> Result<(), EmailValidationError> {
    if local.is_empty() {
        return Err(EmailValidationError::EmptyLocalPart);
    }
    if local.len() > MAX_LOCAL_PART_LENGTH {
        return Err(EmailValidationError::LocalPartTooLong);
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return Err(EmailValidationError::InvalidLocalDot);
    }
    if let Some(c) = local.chars().find(|c| !is_local_char(*c)) {
        return Err(EmailValidationError::InvalidLocalPartChar(c));
    }
    Ok(())
}

fn check_domain(domain: &str) -> Result<(), EmailValidationError> {
    if domain.is_empty() {
        return Err(EmailValidationError::EmptyDomain);
    }
    if let Some(c) = domain
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '.'))
    {
        return Err(EmailValidationError::InvalidDomainChar(c));
    }
    if !domain.contains('.') {
        return Err(EmailValidationError::DomainMissingDot);
    }
    for label in domain.split('.') {
        if label.is_empty()
            || label.len() > MAX_LABEL_LENGTH
            || label.starts_with('-')
            || label.ends_with('-')
        {
            return Err(EmailValidationError::InvalidDomainLabel(label.to_string()));
        }
    }
    Ok(())
}

fn is_local_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '.' | '!' | '#' | '$' | '%' | '&' | '\'' | '*' | '+' | '-' | '/' | '=' | '?' | '^'
                | '_' | '`' | '{' | '|' | '}' | '~'
        )
}

impl fmt::Display for ValidatedEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.email)
    }
}

impl AsRef<str> for ValidatedEmail {
    fn as_ref(&self) -> &str {
        &self.email
    }
}

impl FromStr for ValidatedEmail {
    type Err = EmailValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ValidatedEmail::new(s)
    }
}

impl TryFrom<String> for ValidatedEmail {
    type Error = EmailValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ValidatedEmail::new(&value)
    }
}

impl From<ValidatedEmail> for String {
    fn from(email: ValidatedEmail) -> String {
        email.email
    }
}

/// Validates an email address.
pub fn validate_email(email: &str) -> Result<ValidatedEmail, EmailValidationError> {
    ValidatedEmail::new(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_well_formed() {
        for email in [
            "user@example.com",
            "first.last@mail.example.co.uk",
            "user+alerts@my-domain.org",
            "12345@example.com",
        ] {
            assert!(ValidatedEmail::new(email).is_ok(), "{}", email);
        }
    }

    #[test]
    fn test_rejects_missing_domain() {
        assert_eq!(
            ValidatedEmail::new("foo@"),
            Err(EmailValidationError::EmptyDomain)
        );
    }

    #[test]
    fn test_rejects_missing_at() {
        assert_eq!(
            ValidatedEmail::new("no-at-sign"),
            Err(EmailValidationError::MissingAtSymbol)
        );
    }

    #[test]
    fn test_rejects_malformed() {
        assert_eq!(ValidatedEmail::new("   "), Err(EmailValidationError::Empty));
        assert_eq!(
            ValidatedEmail::new("a@b@example.com"),
            Err(EmailValidationError::MultipleAtSymbols)
        );
        assert_eq!(
            ValidatedEmail::new("@example.com"),
            Err(EmailValidationError::EmptyLocalPart)
        );
        assert_eq!(
            ValidatedEmail::new("user@localhost"),
            Err(EmailValidationError::DomainMissingDot)
        );
        assert_eq!(
            ValidatedEmail::new(".user@example.com"),
            Err(EmailValidationError::InvalidLocalDot)
        );
        assert!(matches!(
            ValidatedEmail::new("user@-bad.com"),
            Err(EmailValidationError::InvalidDomainLabel(_))
        ));
        assert_eq!(
            ValidatedEmail::new("us er@example.com"),
            Err(EmailValidationError::InvalidLocalPartChar(' '))
        );
        assert_eq!(
            ValidatedEmail::new("user@exa_mple.com"),
            Err(EmailValidationError::InvalidDomainChar('_'))
        );
    }

    #[test]
    fn test_length_limits() {
        let local = "a".repeat(65);
        assert_eq!(
            ValidatedEmail::new(&format!("{}@example.com", local)),
            Err(EmailValidationError::LocalPartTooLong)
        );
        let domain = format!("{}.com", "a".repeat(250));
        assert_eq!(
            ValidatedEmail::new(&format!("u@{}", domain)),
            Err(EmailValidationError::TooLong)
        );
    }

    #[test]
    fn test_case_normalization() {
        let a = ValidatedEmail::new("Alert@Example.com").unwrap();
        let b = ValidatedEmail::new("alert@example.COM").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_masked() {
        let email = ValidatedEmail::new("jane@example.com").unwrap();
        assert_eq!(email.masked(), "j***@example.com");
    }

    #[test]
    fn test_serde_round_trip_rejects_invalid() {
        let ok: ValidatedEmail = serde_json::from_str("\"user@example.com\"").unwrap();
        assert_eq!(ok.as_str(), "user@example.com");
        assert!(serde_json::from_str::<ValidatedEmail>("\"invalid\"").is_err());
    }
}
