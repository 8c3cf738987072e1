use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use migration::MigratorTrait;
use serde_json::{json, Value};
use tower::Service;
use uuid::Uuid;

use server::auth::{ServerAuthConfig, ServerState};
use server::routes;

fn cors() -> tower_http::cors::CorsLayer {
    tower_http::cors::CorsLayer::very_permissive()
}

async fn build_app() -> anyhow::Result<Router> {
    let db = models::db::connect().await?;
    // Repeated runs may race on already-applied migrations; ignore those.
    if let Err(e) = migration::Migrator::up(&db, None).await {
        let msg = format!("{}", e);
        if msg.contains("duplicate key value violates unique constraint") {
            eprintln!("migrations already applied, continue: {}", msg);
        } else {
            return Err(e.into());
        }
    }
    let state = ServerState {
        db,
        auth: ServerAuthConfig { jwt_secret: "test-secret".into() },
        // No provider credentials: the proxies must fail before ever needing them
        // for the validation cases exercised here.
        providers: configs::ProvidersConfig::default(),
        http: reqwest::Client::new(),
    };
    Ok(routes::build_router(cors(), state))
}

async fn body_json(resp: axum::response::Response) -> anyhow::Result<Value> {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Register a fresh user and log in; returns the bearer token.
async fn register_and_login(app: &Router, email: &str) -> anyhow::Result<String> {
    let req = Request::builder()
        .method("POST")
        .uri("/auth/register")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&json!({
            "email": email, "name": "Tester", "password": "S3curePass!"
        }))?))?;
    let resp = app.clone().call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&json!({
            "email": email, "password": "S3curePass!"
        }))?))?;
    let resp = app.clone().call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await?;
    Ok(body["token"].as_str().expect("login token").to_string())
}

fn authed(token: &str, method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json");
    match body {
        Some(v) => builder.body(Body::from(v.to_string())).expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

fn paris_trip() -> Value {
    json!({
        "title": "Paris Trip",
        "startDate": "2024-06-01",
        "endDate": "2024-06-10",
        "locations": []
    })
}

#[tokio::test]
async fn paris_trip_scenario() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let app = build_app().await?;
    let token_a = register_and_login(&app, &format!("a_{}@example.com", Uuid::new_v4())).await?;
    let token_b = register_and_login(&app, &format!("b_{}@example.com", Uuid::new_v4())).await?;

    // Create as user A
    let resp = app.clone().call(authed(&token_a, "POST", "/api/itineraries", Some(paris_trip()))).await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = body_json(resp).await?;
    let id = created["id"].as_str().expect("fresh id").to_string();
    assert!(Uuid::parse_str(&id).is_ok());

    // Fetch as user B: exists but foreign, so Forbidden rather than NotFound.
    let resp = app.clone().call(authed(&token_b, "GET", &format!("/api/itineraries/{}", id), None)).await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Fetch as user A: fields round-trip.
    let resp = app.clone().call(authed(&token_a, "GET", &format!("/api/itineraries/{}", id), None)).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched = body_json(resp).await?;
    assert_eq!(fetched["title"], "Paris Trip");
    assert_eq!(fetched["startDate"], "2024-06-01");
    assert_eq!(fetched["endDate"], "2024-06-10");
    assert_eq!(fetched["locations"], json!([]));

    // Delete as user A, then the id is gone.
    let resp = app.clone().call(authed(&token_a, "DELETE", &format!("/api/itineraries/{}", id), None)).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = app.clone().call(authed(&token_a, "GET", &format!("/api/itineraries/{}", id), None)).await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn update_replaces_fields_and_keeps_owner() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let app = build_app().await?;
    let token = register_and_login(&app, &format!("u_{}@example.com", Uuid::new_v4())).await?;

    let resp = app.clone().call(authed(&token, "POST", "/api/itineraries", Some(paris_trip()))).await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = body_json(resp).await?;
    let id = created["id"].as_str().expect("id").to_string();
    let owner = created["userId"].clone();

    let update = json!({
        "title": "Paris Trip, extended",
        "description": "Now with the Loire valley",
        "startDate": "2024-06-01",
        "endDate": "2024-06-14",
        "locations": [{
            "name": "Louvre",
            "address": "Rue de Rivoli, Paris",
            "coordinates": {"lat": 48.8606, "lng": 2.3376},
            "visitDate": "2024-06-02"
        }]
    });
    let resp = app.clone().call(authed(&token, "PUT", &format!("/api/itineraries/{}", id), Some(update))).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = body_json(resp).await?;
    assert_eq!(updated["title"], "Paris Trip, extended");
    assert_eq!(updated["endDate"], "2024-06-14");
    assert_eq!(updated["locations"][0]["coordinates"]["lng"], 2.3376);
    assert_eq!(updated["userId"], owner);
    Ok(())
}

#[tokio::test]
async fn missing_required_fields_rejected() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let app = build_app().await?;
    let token = register_and_login(&app, &format!("m_{}@example.com", Uuid::new_v4())).await?;

    for payload in [
        json!({"startDate": "2024-06-01", "endDate": "2024-06-10"}),
        json!({"title": "No dates"}),
        json!({"title": "", "startDate": "2024-06-01", "endDate": "2024-06-10"}),
        json!({"title": "Blank date", "startDate": "", "endDate": "2024-06-10"}),
    ] {
        let resp = app.clone().call(authed(&token, "POST", "/api/itineraries", Some(payload))).await?;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_json(resp).await?;
        assert_eq!(body["message"], "Missing required fields");
    }

    // Nothing was written by the rejected creates.
    let resp = app.clone().call(authed(&token, "GET", "/api/itineraries", None)).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await?, json!([]));
    Ok(())
}

#[tokio::test]
async fn unparseable_date_gets_a_message_body() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let app = build_app().await?;
    let token = register_and_login(&app, &format!("p_{}@example.com", Uuid::new_v4())).await?;

    let payload = json!({
        "title": "Bad date",
        "startDate": "not-a-date",
        "endDate": "2024-06-10"
    });
    let resp = app.clone().call(authed(&token, "POST", "/api/itineraries", Some(payload))).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await?;
    assert_eq!(body["message"], "Invalid date format");
    Ok(())
}

#[tokio::test]
async fn inverted_date_range_rejected_server_side() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let app = build_app().await?;
    let token = register_and_login(&app, &format!("d_{}@example.com", Uuid::new_v4())).await?;

    let payload = json!({
        "title": "Backwards",
        "startDate": "2024-06-10",
        "endDate": "2024-06-01",
        "locations": []
    });
    let resp = app.clone().call(authed(&token, "POST", "/api/itineraries", Some(payload))).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn malformed_id_rejected_before_lookup() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let app = build_app().await?;
    let token = register_and_login(&app, &format!("i_{}@example.com", Uuid::new_v4())).await?;

    for method in ["GET", "DELETE"] {
        let resp = app.clone().call(authed(&token, method, "/api/itineraries/not-a-uuid", None)).await?;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_json(resp).await?;
        assert_eq!(body["message"], "Invalid itinerary ID");
    }
    Ok(())
}

#[tokio::test]
async fn requests_without_session_are_unauthorized() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let app = build_app().await?;

    for (method, uri) in [
        ("GET", "/api/itineraries"),
        ("POST", "/api/itineraries"),
        ("GET", "/api/weather?lat=48.8&lon=2.3"),
        ("GET", "/api/places?lat=48.8&lon=2.3"),
    ] {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from("{}"))?;
        let resp = app.clone().call(req).await?;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{} {}", method, uri);
    }
    Ok(())
}

#[tokio::test]
async fn gateway_rejects_missing_coordinates_before_upstream() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let app = build_app().await?;
    let token = register_and_login(&app, &format!("w_{}@example.com", Uuid::new_v4())).await?;

    // lat present, lon missing: 400 without touching the provider (the test
    // state carries no provider credentials, so reaching the credential check
    // would surface as a 500 instead).
    for uri in ["/api/weather?lat=48.8", "/api/places?lat=48.8"] {
        let resp = app.clone().call(authed(&token, "GET", uri, None)).await?;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", uri);
        let body = body_json(resp).await?;
        assert_eq!(body["message"], "Latitude and longitude are required");
    }
    Ok(())
}
