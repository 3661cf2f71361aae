//! Configuration loading for the DefendEarth CLI.
//!
//! Settings come from a YAML file, then environment variables override the
//! provider credentials and selections.

use anyhow::{Context, Result};
use de_connectors::{NasaConfig, NominatimConfig, ProvidersConfig, SecureString, UsgsConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

const REDACTED: &str = "***REDACTED***";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Email and SMS providers.
    #[serde(default)]
    pub providers: ProvidersConfig,

    #[serde(default)]
    pub nasa: NasaConfig,

    #[serde(default)]
    pub nominatim: NominatimConfig,

    #[serde(default)]
    pub usgs: UsgsConfig,

    /// Periodic threat monitor.
    #[serde(default)]
    pub monitor: MonitorSettings,

    /// Country code prefixed to bare ten-digit phone numbers (e.g. "91").
    #[serde(default)]
    pub default_country_code: Option<String>,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl AppConfig {
    /// Loads configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Applies overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Applies overrides from `lookup`. Blank values are ignored.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let secret = |name: &str| SecureString::non_empty(lookup(name));

        if let Some(key) = secret("NEXT_PUBLIC_NASA_API_KEY").or_else(|| secret("NASA_API_KEY")) {
            self.nasa.api_key = Some(key);
        }

        let p = &mut self.providers;
        if let Some(provider) = var("DEFEND_EARTH_EMAIL_PROVIDER") {
            p.email_provider = provider
                .parse()
                .context("Invalid DEFEND_EARTH_EMAIL_PROVIDER")?;
        }
        if let Some(provider) = var("DEFEND_EARTH_SMS_PROVIDER") {
            p.sms_provider = provider
                .parse()
                .context("Invalid DEFEND_EARTH_SMS_PROVIDER")?;
        }

        if let Some(user) = var("GMAIL_USER") {
            p.gmail.user = Some(user);
        }
        if let Some(password) = secret("GMAIL_APP_PASSWORD") {
            p.gmail.app_password = Some(password);
        }

        if let Some(sid) = var("TWILIO_ACCOUNT_SID") {
            p.twilio.account_sid = Some(sid);
        }
        if let Some(token) = secret("TWILIO_AUTH_TOKEN") {
            p.twilio.auth_token = Some(token);
        }
        if let Some(number) = var("TWILIO_PHONE_NUMBER") {
            p.twilio.from_number = Some(number);
        }

        if let Some(id) = var("EMAILJS_SERVICE_ID") {
            p.emailjs.service_id = Some(id);
        }
        if let Some(id) = var("EMAILJS_TEMPLATE_ID") {
            p.emailjs.template_id = Some(id);
        }
        if let Some(key) = var("EMAILJS_PUBLIC_KEY") {
            p.emailjs.public_key = Some(key);
        }
        if let Some(key) = secret("EMAILJS_PRIVATE_KEY") {
            p.emailjs.private_key = Some(key);
        }

        if let Some(key) = secret("WEB3FORMS_ACCESS_KEY") {
            p.web3forms.access_key = Some(key);
        }
        if let Some(key) = secret("FAST2SMS_API_KEY") {
            p.fast2sms.api_key = Some(key);
        }
        if let Some(key) = secret("TEXTLOCAL_API_KEY") {
            p.textlocal.api_key = Some(key);
        }
        if let Some(sender) = var("TEXTLOCAL_SENDER") {
            p.textlocal.sender = sender;
        }

        Ok(self)
    }

    /// Creates a copy with secrets redacted.
    pub fn redact_secrets(&self) -> Self {
        let mut config = self.clone();

        let redact = |secret: &mut Option<SecureString>| {
            if secret.as_ref().is_some_and(|s| !s.is_empty()) {
                *secret = Some(SecureString::from(REDACTED));
            }
        };

        redact(&mut config.nasa.api_key);
        redact(&mut config.providers.gmail.app_password);
        redact(&mut config.providers.twilio.auth_token);
        redact(&mut config.providers.emailjs.private_key);
        redact(&mut config.providers.web3forms.access_key);
        redact(&mut config.providers.fast2sms.api_key);
        redact(&mut config.providers.textlocal.api_key);

        config
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_true")]
    pub enable_swagger: bool,

    /// Allowed CORS origins. Empty defers to DEFEND_EARTH_CORS_ALLOWED_ORIGINS,
    /// then allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            enable_swagger: true,
            cors_origins: Vec::new(),
        }
    }
}

/// Threat monitor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Seconds between feed checks.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Days after today included in each feed request.
    #[serde(default = "default_lookahead_days")]
    pub lookahead_days: u32,

    /// Objects closer than this are candidates.
    #[serde(default = "default_miss_distance_km")]
    pub miss_distance_threshold_km: f64,

    /// Candidates larger than this are threats.
    #[serde(default = "default_diameter_m")]
    pub diameter_threshold_m: f64,

    /// Chance that any object is flagged regardless, for demos.
    #[serde(default = "default_random_chance")]
    pub random_chance: f64,
}

fn default_interval_secs() -> u64 {
    de_alerts::monitor::DEFAULT_CHECK_INTERVAL.as_secs()
}

fn default_lookahead_days() -> u32 {
    1
}

fn default_miss_distance_km() -> f64 {
    100_000.0
}

fn default_diameter_m() -> f64 {
    50.0
}

fn default_random_chance() -> f64 {
    0.2
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: default_interval_secs(),
            lookahead_days: default_lookahead_days(),
            miss_distance_threshold_km: default_miss_distance_km(),
            diameter_threshold_m: default_diameter_m(),
            random_chance: default_random_chance(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to use JSON format.
    #[serde(default)]
    pub json_format: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}
