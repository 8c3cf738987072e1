//! Itinerary CRUD endpoints.
//!
//! Handlers translate the wire contract (camelCase JSON, string ids) into
//! service calls and map failures onto fixed status/message pairs. The id is
//! taken from the route parameter and checked before any store access.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use models::itinerary::{ItineraryFields, Location, Model};
use service::itinerary_service;

use crate::auth::{CurrentUser, ServerState};
use crate::errors::ApiError;

/// Create/update payload. Required fields stay optional at the serde level,
/// and dates arrive as plain strings, so absent or malformed values map to a
/// 400 `{message}` body rather than a deserialization rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub locations: Option<Vec<Location>>,
}

fn parse_date(raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| ApiError::bad_request("Invalid date format"))
}

fn parse_fields(input: ItineraryInput) -> Result<ItineraryFields, ApiError> {
    let title = input.title.filter(|t| !t.trim().is_empty());
    let start = input.start_date.filter(|s| !s.trim().is_empty());
    let end = input.end_date.filter(|s| !s.trim().is_empty());
    let (Some(title), Some(start), Some(end)) = (title, start, end) else {
        return Err(ApiError::bad_request("Missing required fields"));
    };
    Ok(ItineraryFields {
        title,
        description: input.description,
        start_date: parse_date(&start)?,
        end_date: parse_date(&end)?,
        locations: input.locations.unwrap_or_default(),
    })
}

fn parse_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::bad_request("Invalid itinerary ID"))
}

#[utoipa::path(get, path = "/api/itineraries", tag = "itineraries", responses((status = 200, description = "Caller's itineraries"), (status = 401, description = "Unauthorized")))]
pub async fn list(State(state): State<ServerState>, user: CurrentUser) -> Result<Json<Vec<Model>>, ApiError> {
    let rows = itinerary_service::list_itineraries(&state.db, user.0)
        .await
        .map_err(|e| ApiError::from_service(e, "Error fetching itineraries"))?;
    Ok(Json(rows))
}

#[utoipa::path(post, path = "/api/itineraries", tag = "itineraries", request_body = crate::openapi::ItineraryRequest, responses((status = 201, description = "Created"), (status = 400, description = "Missing required fields"), (status = 401, description = "Unauthorized")))]
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(input): Json<ItineraryInput>,
) -> Result<(StatusCode, Json<Model>), ApiError> {
    let fields = parse_fields(input)?;
    let created = itinerary_service::create_itinerary(&state.db, user.0, fields)
        .await
        .map_err(|e| ApiError::from_service(e, "Error creating itinerary"))?;
    info!(id = %created.id, user_id = %user.0, "created itinerary");
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/api/itineraries/{id}", tag = "itineraries", params(("id" = String, Path, description = "Itinerary ID")), responses((status = 200, description = "OK"), (status = 400, description = "Invalid ID"), (status = 401, description = "Unauthorized"), (status = 403, description = "Not the owner"), (status = 404, description = "Not Found")))]
pub async fn get(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Model>, ApiError> {
    let id = parse_id(&id)?;
    let found = itinerary_service::get_itinerary(&state.db, user.0, id)
        .await
        .map_err(|e| ApiError::from_service(e, "Error fetching itinerary"))?;
    Ok(Json(found))
}

#[utoipa::path(put, path = "/api/itineraries/{id}", tag = "itineraries", params(("id" = String, Path, description = "Itinerary ID")), request_body = crate::openapi::ItineraryRequest, responses((status = 200, description = "Updated"), (status = 400, description = "Invalid ID or missing fields"), (status = 401, description = "Unauthorized"), (status = 403, description = "Not the owner"), (status = 404, description = "Not Found")))]
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(input): Json<ItineraryInput>,
) -> Result<Json<Model>, ApiError> {
    let id = parse_id(&id)?;
    let fields = parse_fields(input)?;
    let updated = itinerary_service::update_itinerary(&state.db, user.0, id, fields)
        .await
        .map_err(|e| ApiError::from_service(e, "Error updating itinerary"))?;
    info!(id = %updated.id, user_id = %user.0, "updated itinerary");
    Ok(Json(updated))
}

#[utoipa::path(delete, path = "/api/itineraries/{id}", tag = "itineraries", params(("id" = String, Path, description = "Itinerary ID")), responses((status = 200, description = "Deleted"), (status = 400, description = "Invalid ID"), (status = 401, description = "Unauthorized"), (status = 403, description = "Not the owner"), (status = 404, description = "Not Found")))]
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_id(&id)?;
    itinerary_service::delete_itinerary(&state.db, user.0, id)
        .await
        .map_err(|e| ApiError::from_service(e, "Error deleting itinerary"))?;
    info!(id = %id, user_id = %user.0, "deleted itinerary");
    Ok(Json(serde_json::json!({ "message": "Itinerary deleted successfully" })))
}
