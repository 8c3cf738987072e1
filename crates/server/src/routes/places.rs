//! Nearby-places proxy: forwards the query to the Mapbox geocoding API and
//! relays the payload unmodified. Requires a session but no ownership check.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::error;

use crate::auth::{CurrentUser, ServerState};
use crate::errors::ApiError;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct PlacesQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
    /// Mapbox place type filter; defaults to points of interest.
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[utoipa::path(get, path = "/api/places", tag = "gateway", params(PlacesQuery), responses((status = 200, description = "Provider payload"), (status = 400, description = "Missing coordinates"), (status = 401, description = "Unauthorized"), (status = 500, description = "Provider or configuration error")))]
pub async fn nearby_places(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Query(q): Query<PlacesQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (Some(lat), Some(lon)) = (q.lat, q.lon) else {
        return Err(ApiError::bad_request("Latitude and longitude are required"));
    };
    let Some(token) = state.providers.mapbox_access_token.as_deref() else {
        return Err(ApiError::internal("Mapbox API token is not configured"));
    };
    let kind = q.kind.unwrap_or_else(|| "poi".to_string());

    let payload = common::providers::fetch_nearby_places(&state.http, token, &lat, &lon, &kind)
        .await
        .map_err(|e| {
            error!(err = %e, "nearby places fetch failed");
            ApiError::internal("Error fetching nearby places")
        })?;
    Ok(Json(payload))
}
