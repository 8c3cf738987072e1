use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use crate::auth::{self, ServerState};

pub mod itineraries;
pub mod places;
pub mod weather;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "Service is up")))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: health, account endpoints, the
/// itinerary CRUD surface, and the provider proxies.
pub fn build_router(cors: CorsLayer, state: ServerState) -> Router {
    let account = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me));

    let api = Router::new()
        .route(
            "/api/itineraries",
            get(itineraries::list).post(itineraries::create),
        )
        .route(
            "/api/itineraries/:id",
            get(itineraries::get)
                .put(itineraries::update)
                .delete(itineraries::delete),
        )
        .route("/api/places", get(places::nearby_places))
        .route("/api/weather", get(weather::weather));

    let app = Router::new()
        .route("/health", get(health))
        .merge(account)
        .merge(api)
        .with_state(state);

    app.merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", crate::openapi::ApiDoc::openapi()))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // Span per request at INFO, without headers.
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
