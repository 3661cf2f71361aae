//! Alert registration endpoints.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use de_alerts::templates;
use de_connectors::Connector;
use de_core::{Contact, GeoPoint, User, ValidatedEmail, ValidatedPhone};
use metrics::counter;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::dto::{
    DeliveryResult, RegisterRequest, RegisterResponse, RegistrationsResponse, UserSummary,
};
use crate::error::ApiError;
use crate::state::AppState;

/// Creates registration routes.
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/register-sms-alerts",
        get(list_registrations).post(register),
    )
}

/// Register for impact alerts by phone or email.
///
/// The welcome message is sent through the transport matching the contact.
/// A failed welcome does not undo the registration.
#[utoipa::path(
    post,
    path = "/api/register-sms-alerts",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = RegisterResponse),
        (status = 409, description = "Contact already registered"),
        (status = 422, description = "Validation error")
    ),
    tag = "Registration"
)]
#[instrument(skip(state, request))]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    request.validate()?;

    let contact = parse_contact(&request, state.default_country_code.as_deref())?;
    let channel = contact.channel();
    let location = GeoPoint::new(request.latitude, request.longitude)?;

    let location_name = match request.location.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => Some(name.to_string()),
        _ => match state.geocoder.reverse(&location).await {
            Ok(place) => place.map(|p| p.display_name),
            Err(e) => {
                warn!(error = %e, "Reverse geocoding failed, storing coordinates only");
                None
            }
        },
    };

    let user = match state
        .users
        .create(User::new(contact, location, location_name))
        .await
    {
        Ok(user) => user,
        Err(e) => {
            counter!(
                "de_registrations_total",
                "channel" => channel.to_string(),
                "outcome" => "rejected"
            )
            .increment(1);
            return Err(e.into());
        }
    };

    let transport = state.transport_for(channel);
    let result = transport.send(&templates::welcome(&user)).await;
    let welcome = DeliveryResult::from_result(transport.name(), &result);

    let user = match &result {
        Ok(_) => state.users.mark_verified(user.id).await?,
        Err(e) => {
            warn!(
                user_id = %user.id,
                provider = transport.name(),
                error = %e,
                "Welcome message failed"
            );
            user
        }
    };

    counter!(
        "de_registrations_total",
        "channel" => channel.to_string(),
        "outcome" => "ok"
    )
    .increment(1);

    info!(
        user_id = %user.id,
        channel = %channel,
        contact = %user.contact.masked(),
        "Registered user for alerts"
    );

    let message = if welcome.success {
        format!("Registered for {} alerts", channel)
    } else {
        format!("Registered for {} alerts, but the welcome message failed", channel)
    };

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            message,
            user: UserSummary::from(&user),
            welcome,
        }),
    ))
}

/// List registered users with masked contacts.
#[utoipa::path(
    get,
    path = "/api/register-sms-alerts",
    responses(
        (status = 200, description = "Registered users", body = RegistrationsResponse)
    ),
    tag = "Registration"
)]
pub async fn list_registrations(
    State(state): State<AppState>,
) -> Result<Json<RegistrationsResponse>, ApiError> {
    let users = state.users.list().await?;
    Ok(Json(RegistrationsResponse {
        count: users.len(),
        users: users.iter().map(UserSummary::from).collect(),
    }))
}

/// Builds the contact from a request carrying exactly one of phone or email.
fn parse_contact(
    request: &RegisterRequest,
    default_country_code: Option<&str>,
) -> Result<Contact, ApiError> {
    let phone = request.phone.as_deref().map(str::trim).filter(|p| !p.is_empty());
    let email = request.email.as_deref().map(str::trim).filter(|e| !e.is_empty());

    match (phone, email) {
        (Some(phone), None) => {
            let country_code = request.country_code.as_deref().or(default_country_code);
            ValidatedPhone::with_default_country(phone, country_code)
                .map(Contact::Phone)
                .map_err(|e| ApiError::validation_field("phone", "invalid_phone", &e.to_string()))
        }
        (None, Some(email)) => ValidatedEmail::new(email)
            .map(Contact::Email)
            .map_err(|e| ApiError::validation_field("email", "invalid_email", &e.to_string())),
        (Some(_), Some(_)) => Err(ApiError::BadRequest(
            "Provide either phone or email, not both".to_string(),
        )),
        (None, None) => Err(ApiError::BadRequest(
            "Either phone or email is required".to_string(),
        )),
    }
}
