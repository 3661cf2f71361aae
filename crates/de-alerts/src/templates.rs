//! Message templates.
//!
//! SMS bodies are plain text capped at [`MAX_SMS_CHARS`]. Emails carry a
//! plain text body and a minimal HTML alternative.

use de_connectors::OutboundMessage;
use de_core::{AsteroidAlert, Channel, User};

/// Two concatenated SMS segments.
pub const MAX_SMS_CHARS: usize = 320;

const SIGNATURE: &str = "DefendEarth Planetary Defense";

/// Truncates to `max` characters, ending with "..." when cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wraps paragraphs in a bare HTML document.
fn html_document(title: &str, paragraphs: &[String]) -> String {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<p>{}</p>", escape_html(p)))
        .collect();
    format!(
        "<!DOCTYPE html><html><body><h2>{}</h2>{}<p><small>{}</small></p></body></html>",
        escape_html(title),
        body,
        SIGNATURE
    )
}

fn email(recipient: &str, subject: &str, paragraphs: Vec<String>) -> OutboundMessage {
    let text = format!("{}\n\n-- \n{}", paragraphs.join("\n\n"), SIGNATURE);
    OutboundMessage::email(recipient, subject, text).with_html(html_document(subject, &paragraphs))
}

fn sms(recipient: &str, text: &str) -> OutboundMessage {
    OutboundMessage::sms(recipient, truncate_chars(text, MAX_SMS_CHARS))
}

/// Confirmation sent after registration.
pub fn welcome(user: &User) -> OutboundMessage {
    let location = user.location_label();
    match user.channel() {
        Channel::Sms => sms(
            user.contact.address(),
            &format!(
                "DefendEarth: you are registered for asteroid impact alerts near {}. \
                 We will text you if a simulated impact threatens your area.",
                location
            ),
        ),
        Channel::Email => email(
            user.contact.address(),
            "Welcome to DefendEarth impact alerts",
            vec![
                format!(
                    "You are now registered for asteroid impact alerts near {}.",
                    location
                ),
                "We check NASA's near-Earth object feed every few minutes and will \
                 email you if a simulated impact puts your location inside the danger zone."
                    .to_string(),
            ],
        ),
    }
}

/// Warning for a user inside an alert's danger radius.
pub fn impact_alert(alert: &AsteroidAlert, user: &User) -> OutboundMessage {
    let distance_km = alert.impact.distance_km(&user.location);
    match user.channel() {
        Channel::Sms => sms(
            user.contact.address(),
            &format!(
                "DefendEarth {} ALERT: asteroid {} ({:.0} m) projected impact in {:.0} h \
                 at {}, {:.0} km from you. Danger radius {:.0} km. Follow local guidance.",
                alert.threat_level,
                alert.name,
                alert.diameter_m,
                alert.time_to_impact_hours,
                alert.impact,
                distance_km,
                alert.danger_radius_km
            ),
        ),
        Channel::Email => email(
            user.contact.address(),
            &format!(
                "[{}] Asteroid {} impact alert",
                alert.threat_level, alert.name
            ),
            vec![
                format!(
                    "Asteroid {} is projected to impact at {} in about {:.0} hours.",
                    alert.name, alert.impact, alert.time_to_impact_hours
                ),
                format!(
                    "Your registered location ({}) is {:.0} km from the impact point, \
                     inside the {:.0} km danger radius.",
                    user.location_label(),
                    distance_km,
                    alert.danger_radius_km
                ),
                format!(
                    "Estimated diameter {:.0} m, speed {:.1} km/s, energy {:.2} Mt TNT. \
                     Threat level: {}.",
                    alert.diameter_m, alert.speed_km_s, alert.energy_megatons, alert.threat_level
                ),
                "This is a simulated scenario for educational purposes.".to_string(),
            ],
        ),
    }
}

/// A test message, optionally with custom text.
pub fn test_message(
    channel: Channel,
    recipient: &str,
    subject: Option<&str>,
    text: Option<&str>,
) -> OutboundMessage {
    let text = text
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or("This is a test message from DefendEarth. Your alert channel works.");
    match channel {
        Channel::Sms => sms(recipient, text),
        Channel::Email => email(
            recipient,
            subject.unwrap_or("DefendEarth test message"),
            vec![text.to_string()],
        ),
    }
}
