//! Users registered for impact alerts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::GeoPoint;
use crate::validation::{ValidatedEmail, ValidatedPhone};

/// Delivery channel for a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Email,
    Sms,
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Channel::Email => f.write_str("email"),
            Channel::Sms => f.write_str("sms"),
        }
    }
}

/// How a user is reached.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Contact {
    Email(ValidatedEmail),
    Phone(ValidatedPhone),
}

impl Contact {
    pub fn channel(&self) -> Channel {
        match self {
            Contact::Email(_) => Channel::Email,
            Contact::Phone(_) => Channel::Sms,
        }
    }

    /// The address or number a transport delivers to.
    pub fn address(&self) -> &str {
        match self {
            Contact::Email(email) => email.as_str(),
            Contact::Phone(phone) => phone.as_str(),
        }
    }

    pub fn masked(&self) -> String {
        match self {
            Contact::Email(email) => email.masked(),
            Contact::Phone(phone) => phone.masked(),
        }
    }
}

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub contact: Contact,
    pub location: GeoPoint,
    /// Human-readable place name supplied at registration.
    pub location_name: Option<String>,
    pub verified: bool,
    pub registered_at: DateTime<Utc>,
}

impl User {
    pub fn new(contact: Contact, location: GeoPoint, location_name: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            contact,
            location,
            location_name,
            verified: false,
            registered_at: Utc::now(),
        }
    }

    pub fn channel(&self) -> Channel {
        self.contact.channel()
    }

    /// Display label for the user's location.
    pub fn location_label(&self) -> String {
        self.location_name
            .clone()
            .unwrap_or_else(|| self.location.to_string())
    }
}
