//! Check command - runs one threat check against the NASA feed.

use anyhow::{bail, Context, Result};
use chrono::{Duration, NaiveDate, Utc};
use colored::Colorize;
use std::sync::Arc;

use de_alerts::{AlertDispatcher, AlertMonitor, ThreatCheckReport};
use de_connectors::data::nasa::MAX_FEED_DAYS;
use de_core::{InMemoryUserRepository, ThreatLevel};

use super::{monitor_config, Services};
use crate::config::AppConfig;

/// Options for a one-off threat check.
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// First feed day; defaults to today.
    pub start: Option<NaiveDate>,
    /// Days after `start` to include; defaults to the monitor lookahead.
    pub days: Option<u32>,
    /// Overrides the configured random flag chance.
    pub random_chance: Option<f64>,
}

impl CheckOptions {
    fn window(&self, lookahead_days: u32) -> Result<(NaiveDate, NaiveDate)> {
        let start = self.start.unwrap_or_else(|| Utc::now().date_naive());
        let days = i64::from(self.days.unwrap_or(lookahead_days));
        if days > MAX_FEED_DAYS {
            bail!("--days must be at most {} (got {})", MAX_FEED_DAYS, days);
        }
        let end = start
            .checked_add_signed(Duration::days(days))
            .with_context(|| format!("Feed window starting {} is out of range", start))?;
        Ok((start, end))
    }

    fn random_chance(&self) -> Result<Option<f64>> {
        match self.random_chance {
            Some(chance) if !(0.0..=1.0).contains(&chance) => {
                bail!("--random-chance must be between 0 and 1 (got {})", chance)
            }
            chance => Ok(chance),
        }
    }
}

/// Evaluates the feed without notifying anyone. No users are registered in
/// this process, so dispatch reports stay empty.
pub async fn run_check(options: CheckOptions, app_config: AppConfig, json: bool) -> Result<()> {
    let mut settings = app_config.monitor.clone();
    let (start, end) = options.window(settings.lookahead_days)?;
    if let Some(chance) = options.random_chance()? {
        settings.random_chance = chance;
    }

    let services = Services::from_config(&app_config)?;
    let monitor = AlertMonitor::new(
        Arc::clone(&services.neo),
        Arc::new(InMemoryUserRepository::new()),
        AlertDispatcher::new(Arc::clone(&services.email)),
        AlertDispatcher::new(Arc::clone(&services.sms)),
        monitor_config(&settings),
    );

    let report = monitor
        .run_check_for(start, end)
        .await
        .context("Threat check failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &ThreatCheckReport) {
    println!("{}", "Threat Check".bold());
    println!("────────────");
    println!(
        "Window: {} to {} ({} objects)",
        report.window_start, report.window_end, report.objects_checked
    );

    if report.threats.is_empty() {
        println!("{}", "No threats detected".green());
        return;
    }

    println!();
    for threat in &report.threats {
        let level = match threat.threat_level {
            ThreatLevel::Catastrophic | ThreatLevel::High => threat.threat_level.to_string().red(),
            ThreatLevel::Moderate => threat.threat_level.to_string().yellow(),
            ThreatLevel::Low => threat.threat_level.to_string().cyan(),
        };
        println!(
            "  [{}] {} - {:.0} m at {:.1} km/s, {:.2} Mt",
            level, threat.name, threat.diameter_m, threat.speed_km_s, threat.energy_megatons
        );
        println!(
            "      impact {} in {:.1} h, danger radius {:.0} km",
            threat.impact, threat.time_to_impact_hours, threat.danger_radius_km
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_defaults_to_lookahead() {
        let options = CheckOptions {
            start: NaiveDate::from_ymd_opt(2029, 4, 10),
            ..CheckOptions::default()
        };
        let (start, end) = options.window(2).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2029, 4, 10).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2029, 4, 12).unwrap());

        let options = CheckOptions {
            days: Some(0),
            ..options
        };
        let (start, end) = options.window(2).unwrap();
        assert_eq!(start, end);
    }

    #[test]
    fn test_window_rejects_oversized_days() {
        let options = CheckOptions {
            start: NaiveDate::from_ymd_opt(2029, 4, 10),
            days: Some(u32::MAX),
            ..CheckOptions::default()
        };
        let err = options.window(1).unwrap_err();
        assert!(err.to_string().contains("at most 7"));

        let options = CheckOptions {
            days: Some(7),
            ..options
        };
        assert!(options.window(1).is_ok());
    }

    #[test]
    fn test_window_near_max_date_is_an_error() {
        let options = CheckOptions {
            start: Some(NaiveDate::MAX),
            days: Some(1),
            ..CheckOptions::default()
        };
        assert!(options.window(1).is_err());
    }

    #[test]
    fn test_random_chance_must_be_a_probability() {
        let with = |chance: f64| CheckOptions {
            random_chance: Some(chance),
            ..CheckOptions::default()
        };

        assert_eq!(with(0.5).random_chance().unwrap(), Some(0.5));
        assert_eq!(CheckOptions::default().random_chance().unwrap(), None);
        assert!(with(f64::NAN).random_chance().is_err());
        assert!(with(1.5).random_chance().is_err());
        assert!(with(-0.1).random_chance().is_err());
    }
}
