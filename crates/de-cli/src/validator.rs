//! Startup validation for DefendEarth configuration.
//!
//! Missing provider credentials are warnings, since every transport falls
//! back to demo mode. Malformed values are errors.

use crate::config::AppConfig;
use colored::Colorize;
use de_connectors::data::nasa::MAX_FEED_DAYS;
use de_core::{validate_email, validate_phone};

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Critical errors that prevent startup.
    pub errors: Vec<String>,
    /// Warnings that should be addressed but don't prevent startup.
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Prints the validation result to the console.
    pub fn print(&self) {
        if !self.warnings.is_empty() {
            println!();
            println!("{}", "Configuration Warnings:".yellow().bold());
            for warning in &self.warnings {
                println!("  {} {}", "⚠".yellow(), warning);
            }
        }

        if !self.errors.is_empty() {
            println!();
            println!("{}", "Configuration Errors:".red().bold());
            for error in &self.errors {
                println!("  {} {}", "✗".red(), error);
            }
        }

        if self.errors.is_empty() && self.warnings.is_empty() {
            println!("  {} Configuration OK", "✓".green());
        }
    }
}

/// Validates application configuration before startup.
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &AppConfig) -> ValidationResult {
        let mut result = ValidationResult::new();

        Self::validate_server(config, &mut result);
        Self::validate_email_providers(config, &mut result);
        Self::validate_sms_providers(config, &mut result);
        Self::validate_upstream(config, &mut result);
        Self::validate_monitor(config, &mut result);
        Self::validate_country_code(config, &mut result);
        Self::validate_logging(config, &mut result);

        result
    }

    fn validate_server(config: &AppConfig, result: &mut ValidationResult) {
        if config.server.port == 0 {
            result.add_error("server.port must be between 1 and 65535");
        }

        for origin in &config.server.cors_origins {
            if !origin.starts_with("http://") && !origin.starts_with("https://") {
                result.add_error(format!(
                    "Invalid CORS origin '{}'. Origins must start with http:// or https://",
                    origin
                ));
            }
        }
    }

    fn validate_email_providers(config: &AppConfig, result: &mut ValidationResult) {
        let providers = &config.providers;

        if let Some(user) = &providers.gmail.user {
            if let Err(e) = validate_email(user) {
                result.add_error(format!("GMAIL_USER '{}' is not a valid address: {}", user, e));
            }
        }

        let selected = providers
            .status()
            .into_iter()
            .find(|s| s.selected && s.channel == de_core::Channel::Email);
        if let Some(status) = selected {
            if !status.configured {
                result.add_warning(format!(
                    "Email provider '{}' has no credentials. Emails will run in demo mode \
                     and nothing will be delivered.",
                    status.name
                ));
            }
        }

        if !providers.gmail.is_configured() {
            result.add_warning(
                "Gmail is not configured (GMAIL_USER, GMAIL_APP_PASSWORD). \
                 The Gmail test endpoint will run in demo mode.",
            );
        }
    }

    fn validate_sms_providers(config: &AppConfig, result: &mut ValidationResult) {
        let providers = &config.providers;

        if let Some(number) = &providers.twilio.from_number {
            if let Err(e) = validate_phone(number) {
                result.add_error(format!(
                    "TWILIO_PHONE_NUMBER '{}' must be in E.164 format: {}",
                    number, e
                ));
            }
        }

        let sender = &providers.textlocal.sender;
        if sender.is_empty() || sender.len() > 11 {
            result.add_error(format!(
                "TEXTLOCAL_SENDER '{}' must be 1 to 11 characters",
                sender
            ));
        }

        let selected = providers
            .status()
            .into_iter()
            .find(|s| s.selected && s.channel == de_core::Channel::Sms);
        if let Some(status) = selected {
            if !status.configured {
                result.add_warning(format!(
                    "SMS provider '{}' has no credentials. SMS will run in demo mode \
                     and nothing will be delivered.",
                    status.name
                ));
            }
        }
    }

    fn validate_upstream(config: &AppConfig, result: &mut ValidationResult) {
        if config.nasa.uses_demo_key() {
            result.add_warning(
                "NASA_API_KEY not set. Using DEMO_KEY, which is limited to 30 requests \
                 per hour. Get a free key at https://api.nasa.gov",
            );
        }

        for (name, url) in [
            ("nasa.base_url", &config.nasa.base_url),
            ("nominatim.base_url", &config.nominatim.base_url),
            ("usgs.base_url", &config.usgs.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                result.add_error(format!("{} '{}' must be an http(s) URL", name, url));
            }
        }

        let nominatim = &config.nominatim;
        if nominatim.requests_per_second == 0 {
            result.add_error("nominatim.requests_per_second must be at least 1");
        } else if nominatim.requests_per_second > 1 {
            result.add_warning(format!(
                "nominatim.requests_per_second is {}. The public Nominatim usage policy \
                 allows at most 1 request per second.",
                nominatim.requests_per_second
            ));
        }
        if nominatim.user_agent.trim().is_empty() {
            result.add_error("nominatim.user_agent must identify the application");
        }
    }

    fn validate_monitor(config: &AppConfig, result: &mut ValidationResult) {
        let monitor = &config.monitor;
        if !monitor.enabled {
            return;
        }

        if monitor.interval_secs == 0 {
            result.add_error("monitor.interval_secs must be greater than 0");
        } else if monitor.interval_secs < 120 && config.nasa.uses_demo_key() {
            result.add_warning(format!(
                "monitor.interval_secs is {} with the NASA DEMO_KEY. Checks will exhaust \
                 the hourly rate limit.",
                monitor.interval_secs
            ));
        }

        if i64::from(monitor.lookahead_days) > MAX_FEED_DAYS {
            result.add_error(format!(
                "monitor.lookahead_days is {}, but the NASA feed covers at most {} days",
                monitor.lookahead_days, MAX_FEED_DAYS
            ));
        }

        if !(0.0..=1.0).contains(&monitor.random_chance) {
            result.add_error(format!(
                "monitor.random_chance is {}, must be between 0 and 1",
                monitor.random_chance
            ));
        } else if monitor.random_chance > 0.0 {
            result.add_warning(format!(
                "monitor.random_chance is {}. Objects will be flagged at random and \
                 registered users will receive drill alerts.",
                monitor.random_chance
            ));
        }

        if monitor.miss_distance_threshold_km <= 0.0 {
            result.add_error("monitor.miss_distance_threshold_km must be positive");
        }
        if monitor.diameter_threshold_m <= 0.0 {
            result.add_error("monitor.diameter_threshold_m must be positive");
        }
    }

    fn validate_country_code(config: &AppConfig, result: &mut ValidationResult) {
        if let Some(code) = &config.default_country_code {
            let digits = code.trim_start_matches('+');
            if digits.is_empty() || digits.len() > 3 || !digits.chars().all(|c| c.is_ascii_digit())
            {
                result.add_error(format!(
                    "default_country_code '{}' must be 1 to 3 digits",
                    code
                ));
            }
        }
    }

    fn validate_logging(config: &AppConfig, result: &mut ValidationResult) {
        let level = config.logging.level.to_lowercase();
        if !matches!(
            level.as_str(),
            "trace" | "debug" | "info" | "warn" | "error"
        ) {
            result.add_error(format!(
                "Invalid logging.level '{}'. Must be one of: trace, debug, info, warn, error",
                config.logging.level
            ));
        }
    }
}
