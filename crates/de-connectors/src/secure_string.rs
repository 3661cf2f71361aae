//! Credential wrapper that zeroizes its memory on drop.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::Zeroizing;

/// A provider credential (API key, auth token, app password).
///
/// `Debug` and `Display` never print the value, and equality is constant-time.
///
/// ```
/// use de_connectors::SecureString;
///
/// let token = SecureString::new("sk_live_0123456789".to_string());
/// assert_eq!(token.expose_secret(), "sk_live_0123456789");
/// assert_eq!(token.hint(), "****6789");
/// ```
#[derive(Clone, Default)]
pub struct SecureString(Zeroizing<String>);

impl SecureString {
    pub fn new(s: String) -> Self {
        Self(Zeroizing::new(s))
    }

    /// Wraps a configured value, treating blank strings as absent.
    pub fn non_empty(value: Option<String>) -> Option<Self> {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(Self::new)
    }

    /// Exposes the secret for use in a request. Avoid copying the result.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Last four characters behind a mask, for status pages.
    /// Secrets of eight characters or fewer are fully masked.
    pub fn hint(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 8 {
            return "****".to_string();
        }
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("****{}", tail)
    }
}

impl From<String> for SecureString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecureString {
    fn from(s: &str) -> Self {
        Self::new(s.to_string())
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecureString([REDACTED])")
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl PartialEq for SecureString {
    fn eq(&self, other: &Self) -> bool {
        use subtle::ConstantTimeEq;
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

impl Eq for SecureString {}

/// Serializes the real value so configuration files round-trip. Use
/// redaction before displaying serialized config.
impl Serialize for SecureString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SecureString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(SecureString::new(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_and_display_redacted() {
        let secret = SecureString::new("twilio-auth-token".to_string());
        assert!(!format!("{:?}", secret).contains("twilio"));
        assert_eq!(format!("{}", secret), "[REDACTED]");
    }

    #[test]
    fn test_non_empty_filters_blank() {
        assert!(SecureString::non_empty(None).is_none());
        assert!(SecureString::non_empty(Some("   ".to_string())).is_none());
        let key = SecureString::non_empty(Some(" abc ".to_string())).unwrap();
        assert_eq!(key.expose_secret(), "abc");
    }

    #[test]
    fn test_hint() {
        assert_eq!(SecureString::from("short").hint(), "****");
        assert_eq!(SecureString::from("AC0123456789abcd").hint(), "****abcd");
    }

    #[test]
    fn test_equality() {
        assert_eq!(SecureString::from("same"), SecureString::from("same"));
        assert_ne!(SecureString::from("same"), SecureString::from("other"));
    }

    #[test]
    fn test_serde_round_trip() {
        let original = SecureString::from("app-password");
        let json = serde_json::to_string(&original).unwrap();
        let back: SecureString = serde_json::from_str(&json).unwrap();
        assert_eq!(original, back);
    }
}
