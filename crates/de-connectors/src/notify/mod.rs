//! Email and SMS notification transports.
//!
//! Each transport runs in demo mode when its credentials are absent: `send`
//! makes no network call and returns a receipt with a `demo_<provider>_` id.
//! [`ProvidersConfig`] holds the settings for every provider and builds the
//! selected email and SMS transports.

pub mod emailjs;
pub mod fast2sms;
pub mod gmail;
pub mod mock;
pub mod textlocal;
pub mod twilio;
pub mod web3forms;

pub use emailjs::{EmailJsConfig, EmailJsTransport};
pub use fast2sms::{Fast2SmsConfig, Fast2SmsTransport};
pub use gmail::{GmailConfig, GmailTransport};
pub use mock::{MockTransport, RecordedMessage};
pub use textlocal::{TextLocalConfig, TextLocalTransport};
pub use twilio::{TwilioConfig, TwilioTransport};
pub use web3forms::{Web3FormsConfig, Web3FormsTransport};

use crate::traits::{ConnectorError, ConnectorResult, NotificationTransport};
use de_core::Channel;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Email delivery provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailProvider {
    #[default]
    Gmail,
    EmailJs,
    Web3Forms,
}

impl EmailProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailProvider::Gmail => "gmail",
            EmailProvider::EmailJs => "emailjs",
            EmailProvider::Web3Forms => "web3forms",
        }
    }
}

impl fmt::Display for EmailProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmailProvider {
    type Err = ConnectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gmail" | "smtp" => Ok(EmailProvider::Gmail),
            "emailjs" => Ok(EmailProvider::EmailJs),
            "web3forms" => Ok(EmailProvider::Web3Forms),
            other => Err(ConnectorError::ConfigError(format!(
                "Unknown email provider '{}'",
                other
            ))),
        }
    }
}

/// SMS delivery provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmsProvider {
    #[default]
    Twilio,
    Fast2Sms,
    TextLocal,
}

impl SmsProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            SmsProvider::Twilio => "twilio",
            SmsProvider::Fast2Sms => "fast2sms",
            SmsProvider::TextLocal => "textlocal",
        }
    }
}

impl fmt::Display for SmsProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SmsProvider {
    type Err = ConnectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "twilio" => Ok(SmsProvider::Twilio),
            "fast2sms" => Ok(SmsProvider::Fast2Sms),
            "textlocal" => Ok(SmsProvider::TextLocal),
            other => Err(ConnectorError::ConfigError(format!(
                "Unknown SMS provider '{}'",
                other
            ))),
        }
    }
}

/// Whether a provider has credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderStatus {
    pub name: String,
    pub channel: Channel,
    pub configured: bool,
    /// True when this provider is the one used for its channel.
    pub selected: bool,
    /// Masked identity (account, sender or key hint) when configured.
    pub identity: Option<String>,
}

/// Settings for every notification provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub email_provider: EmailProvider,
    pub sms_provider: SmsProvider,
    pub gmail: GmailConfig,
    pub emailjs: EmailJsConfig,
    pub web3forms: Web3FormsConfig,
    pub twilio: TwilioConfig,
    pub fast2sms: Fast2SmsConfig,
    pub textlocal: TextLocalConfig,
}

impl ProvidersConfig {
    /// Builds the transport for the selected email provider.
    pub fn email_transport(&self) -> ConnectorResult<Arc<dyn NotificationTransport>> {
        Ok(match self.email_provider {
            EmailProvider::Gmail => Arc::new(GmailTransport::new(self.gmail.clone())?),
            EmailProvider::EmailJs => Arc::new(EmailJsTransport::new(self.emailjs.clone())?),
            EmailProvider::Web3Forms => {
                Arc::new(Web3FormsTransport::new(self.web3forms.clone())?)
            }
        })
    }

    /// Builds the transport for the selected SMS provider.
    pub fn sms_transport(&self) -> ConnectorResult<Arc<dyn NotificationTransport>> {
        Ok(match self.sms_provider {
            SmsProvider::Twilio => Arc::new(TwilioTransport::new(self.twilio.clone())?),
            SmsProvider::Fast2Sms => Arc::new(Fast2SmsTransport::new(self.fast2sms.clone())?),
            SmsProvider::TextLocal => Arc::new(TextLocalTransport::new(self.textlocal.clone())?),
        })
    }

    /// The Gmail transport, regardless of the selected email provider.
    pub fn gmail_transport(&self) -> ConnectorResult<Arc<dyn NotificationTransport>> {
        Ok(Arc::new(GmailTransport::new(self.gmail.clone())?))
    }

    /// Configuration status of every provider.
    pub fn status(&self) -> Vec<ProviderStatus> {
        let email = |provider: EmailProvider, configured: bool, identity: Option<String>| {
            ProviderStatus {
                name: provider.to_string(),
                channel: Channel::Email,
                configured,
                selected: self.email_provider == provider,
                identity,
            }
        };
        let sms = |provider: SmsProvider, configured: bool, identity: Option<String>| {
            ProviderStatus {
                name: provider.to_string(),
                channel: Channel::Sms,
                configured,
                selected: self.sms_provider == provider,
                identity,
            }
        };

        vec![
            email(
                EmailProvider::Gmail,
                self.gmail.is_configured(),
                self.gmail.masked_user(),
            ),
            email(
                EmailProvider::EmailJs,
                self.emailjs.is_configured(),
                self.emailjs.service_id.clone(),
            ),
            email(
                EmailProvider::Web3Forms,
                self.web3forms.is_configured(),
                self.web3forms.access_key.as_ref().map(|k| k.hint()),
            ),
            sms(
                SmsProvider::Twilio,
                self.twilio.is_configured(),
                self.twilio.from_number.clone(),
            ),
            sms(
                SmsProvider::Fast2Sms,
                self.fast2sms.is_configured(),
                self.fast2sms.api_key.as_ref().map(|k| k.hint()),
            ),
            sms(
                SmsProvider::TextLocal,
                self.textlocal.is_configured(),
                Some(self.textlocal.sender.clone()),
            ),
        ]
    }
}
