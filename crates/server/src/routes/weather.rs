//! Weather proxy: two OpenWeather calls (current conditions and 5-day
//! forecast) joined into one payload. Either upstream failing fails the whole
//! request; there is no partial result.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::error;

use crate::auth::{CurrentUser, ServerState};
use crate::errors::ApiError;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct WeatherQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
}

#[utoipa::path(get, path = "/api/weather", tag = "gateway", params(WeatherQuery), responses((status = 200, description = "Current conditions and forecast"), (status = 400, description = "Missing coordinates"), (status = 401, description = "Unauthorized"), (status = 500, description = "Provider or configuration error")))]
pub async fn weather(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Query(q): Query<WeatherQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (Some(lat), Some(lon)) = (q.lat, q.lon) else {
        return Err(ApiError::bad_request("Latitude and longitude are required"));
    };
    let Some(api_key) = state.providers.openweather_api_key.as_deref() else {
        return Err(ApiError::internal("Weather API key is not configured"));
    };

    let current = common::providers::fetch_current_weather(&state.http, api_key, &lat, &lon)
        .await
        .map_err(|e| {
            error!(err = %e, "current weather fetch failed");
            ApiError::internal("Error fetching weather data")
        })?;
    let forecast = common::providers::fetch_forecast(&state.http, api_key, &lat, &lon)
        .await
        .map_err(|e| {
            error!(err = %e, "forecast fetch failed");
            ApiError::internal("Error fetching weather data")
        })?;

    Ok(Json(serde_json::json!({
        "current": current,
        "forecast": forecast,
    })))
}
