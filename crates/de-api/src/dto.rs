//! Data Transfer Objects (DTOs) for API requests and responses.

use chrono::{DateTime, NaiveDate, Utc};
use de_connectors::{ConnectorError, ConnectorResult, DeliveryReceipt, ProviderStatus};
use de_core::{
    AsteroidParameters, Channel, GeoPoint, ImpactEffects, PlaceKind, RiskPrediction,
    TerrainClass, User,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

// ============================================================================
// Health DTOs
// ============================================================================

/// Health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// "healthy", or "degraded" when a transport runs in demo mode.
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub registered_users: usize,
    pub email: TransportHealth,
    pub sms: TransportHealth,
    pub monitor_running: bool,
}

/// Health of one notification transport.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TransportHealth {
    pub provider: String,
    pub demo: bool,
}

// ============================================================================
// Registration DTOs
// ============================================================================

/// Registration for impact alerts. Exactly one of `phone` or `email` is required.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 32, message = "Phone must be 1-32 characters"))]
    pub phone: Option<String>,
    #[validate(length(min = 3, max = 254, message = "Email must be 3-254 characters"))]
    pub email: Option<String>,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: f64,
    #[validate(range(
        min = -180.0,
        max = 180.0,
        message = "Longitude must be between -180 and 180"
    ))]
    pub longitude: f64,
    /// Human-readable location; looked up from coordinates when omitted.
    #[validate(length(max = 200, message = "Location must be at most 200 characters"))]
    pub location: Option<String>,
    /// Country code for bare ten-digit phone numbers, e.g. "91".
    #[validate(length(min = 1, max = 4))]
    pub country_code: Option<String>,
}

/// A registered user with the contact masked.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    pub id: Uuid,
    #[schema(value_type = String)]
    pub channel: Channel,
    pub contact: String,
    pub latitude: f64,
    pub longitude: f64,
    pub location_name: Option<String>,
    pub verified: bool,
    pub registered_at: DateTime<Utc>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            channel: user.channel(),
            contact: user.contact.masked(),
            latitude: user.location.latitude,
            longitude: user.location.longitude,
            location_name: user.location_name.clone(),
            verified: user.verified,
            registered_at: user.registered_at,
        }
    }
}

/// Result of one send through a provider.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeliveryResult {
    pub success: bool,
    pub provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    /// True when the send was simulated because credentials are missing.
    pub demo: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeliveryResult {
    pub fn from_result(provider: &str, result: &ConnectorResult<DeliveryReceipt>) -> Self {
        match result {
            Ok(receipt) => Self {
                success: true,
                provider: receipt.provider.clone(),
                message_id: Some(receipt.message_id.clone()),
                demo: receipt.demo,
                error: None,
            },
            Err(e) => Self::failed(provider, e),
        }
    }

    pub fn failed(provider: &str, error: &ConnectorError) -> Self {
        Self {
            success: false,
            provider: provider.to_string(),
            message_id: None,
            demo: false,
            error: Some(error.to_string()),
        }
    }
}

/// Response to a successful registration.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub user: UserSummary,
    /// Outcome of the welcome message.
    pub welcome: DeliveryResult,
}

/// Registered users with masked contacts.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegistrationsResponse {
    pub count: usize,
    pub users: Vec<UserSummary>,
}

// ============================================================================
// Test message DTOs
// ============================================================================

/// Test SMS request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct TestSmsRequest {
    #[validate(length(min = 1, max = 32, message = "Phone must be 1-32 characters"))]
    pub phone: String,
    #[validate(length(max = 320, message = "Message must be at most 320 characters"))]
    pub message: Option<String>,
    #[validate(length(min = 1, max = 4))]
    pub country_code: Option<String>,
}

/// Test email request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct TestEmailRequest {
    #[validate(length(min = 3, max = 254, message = "Email must be 3-254 characters"))]
    pub email: String,
    #[validate(length(max = 200, message = "Subject must be at most 200 characters"))]
    pub subject: Option<String>,
    #[validate(length(max = 5000, message = "Message must be at most 5000 characters"))]
    pub message: Option<String>,
}

/// Gmail configuration status.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GmailStatusResponse {
    pub provider: String,
    pub configured: bool,
    pub demo: bool,
    /// Masked sender account.
    pub user: Option<String>,
}

// ============================================================================
// Lookup DTOs
// ============================================================================

/// Coordinates query for geology and population lookups.
#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
pub struct CoordinatesQuery {
    #[validate(range(min = -90.0, max = 90.0, message = "lat must be between -90 and 90"))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "lng must be between -180 and 180"))]
    pub lng: f64,
}

impl CoordinatesQuery {
    pub fn point(&self) -> GeoPoint {
        GeoPoint {
            latitude: self.lat,
            longitude: self.lng,
        }
    }
}

/// Terrain at a point.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GeologyResponse {
    pub latitude: f64,
    pub longitude: f64,
    /// Elevation in meters; absent when USGS has no data.
    pub elevation_m: Option<f64>,
    #[schema(value_type = String)]
    pub terrain: TerrainClass,
    pub rock_type: String,
    pub target_density_kg_m3: f64,
    pub is_ocean: bool,
    /// True when the elevation service failed and defaults were used.
    pub fallback: bool,
}

/// Population density around a point.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PopulationResponse {
    pub latitude: f64,
    pub longitude: f64,
    pub place_name: Option<String>,
    #[schema(value_type = String)]
    pub place_kind: PlaceKind,
    pub osm_type: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub density_per_km2: f64,
    /// People within 10 km at the estimated density.
    pub population_within_10km: f64,
    /// True when the geocoder failed and defaults were used.
    pub fallback: bool,
}

/// NASA NEO query. Feed mode by default; `mode=browse` pages the catalogue.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct NasaQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub mode: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl NasaQuery {
    pub fn is_browse(&self) -> bool {
        self.mode
            .as_deref()
            .is_some_and(|m| m.eq_ignore_ascii_case("browse"))
    }
}

// ============================================================================
// Debug DTOs
// ============================================================================

/// Provider and monitor diagnostics.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DebugResponse {
    pub email_provider: String,
    pub sms_provider: String,
    pub email_demo: bool,
    pub sms_demo: bool,
    #[schema(value_type = Vec<Object>)]
    pub providers: Vec<ProviderStatus>,
    pub nasa_demo_key: bool,
    pub registered_users: usize,
    pub monitor: Option<MonitorStatus>,
}

/// Threat monitor status.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MonitorStatus {
    pub interval_secs: u64,
    pub lookahead_days: u32,
    pub last_check: Option<DateTime<Utc>>,
    pub last_threats: Option<usize>,
}

/// Unmasked dump of every registered user.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DebugUsersResponse {
    pub count: usize,
    #[schema(value_type = Vec<Object>)]
    pub users: Vec<User>,
}

// ============================================================================
// Impact DTOs
// ============================================================================

/// Impact simulation request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ImpactRequest {
    #[validate(range(min = 0.1, max = 100000.0, message = "Diameter must be 0.1-100000 m"))]
    pub diameter_m: f64,
    #[validate(range(min = 1.0, max = 100.0, message = "Velocity must be 1-100 km/s"))]
    pub velocity_km_s: f64,
    #[validate(range(min = 500.0, max = 10000.0, message = "Density must be 500-10000 kg/m³"))]
    pub density_kg_m3: Option<f64>,
    #[validate(range(min = 1.0, max = 90.0, message = "Impact angle must be 1-90 degrees"))]
    pub impact_angle_deg: Option<f64>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    /// Days between detection and impact (default: 365).
    #[validate(range(min = 0.0, max = 36500.0))]
    pub warning_time_days: Option<f64>,
}

/// What is known about the impact site.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ImpactSite {
    pub latitude: f64,
    pub longitude: f64,
    pub place_name: Option<String>,
    pub elevation_m: Option<f64>,
    #[schema(value_type = Option<String>)]
    pub terrain: Option<TerrainClass>,
    pub population_density_per_km2: Option<f64>,
}

/// Impact simulation result.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ImpactResponse {
    #[schema(value_type = Object)]
    pub parameters: AsteroidParameters,
    #[schema(value_type = Object)]
    pub effects: ImpactEffects,
    #[schema(value_type = Object)]
    pub risk: RiskPrediction,
    pub site: Option<ImpactSite>,
}
