//! Session plumbing and the account endpoints.
//!
//! Sessions are HS256 JWTs carried either in an `auth_token` HttpOnly cookie
//! (set at login) or an `Authorization: Bearer` header. `CurrentUser` is the
//! only way handlers learn who is calling; it yields the caller id or 401.

use std::sync::Arc;

use axum::extract::{FromRequestParts, State};
use axum::http::{header, request::Parts, StatusCode};
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use service::auth::domain::{LoginInput, RegisterInput};
use service::auth::errors::AuthError;
use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::service::{AuthConfig, AuthService};

use crate::errors::ApiError;

#[derive(Clone)]
pub struct ServerAuthConfig {
    pub jwt_secret: String,
}

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: ServerAuthConfig,
    pub providers: configs::ProvidersConfig,
    pub http: reqwest::Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterOutput { pub user_id: Uuid }

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeOutput { pub user_id: Uuid, pub email: String, pub name: String }

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOutput { pub user_id: Uuid, pub email: String, pub name: String, pub token: String }

#[derive(Debug, Deserialize)]
struct Claims {
    #[allow(dead_code)]
    sub: Option<String>,
    uid: Option<String>,
    #[allow(dead_code)]
    exp: Option<usize>,
}

/// The authenticated caller; extraction answers the one question the rest of
/// the app asks of a session: which user id is behind this request.
pub struct CurrentUser(pub Uuid);

#[axum::async_trait]
impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &ServerState) -> Result<Self, Self::Rejection> {
        let Some(token) = token_from_parts(parts) else {
            return Err(ApiError::unauthorized());
        };
        let key = DecodingKey::from_secret(state.auth.jwt_secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        let data = decode::<Claims>(&token, &key, &validation).map_err(|e| {
            warn!(err = %e, "token validation failed");
            ApiError::unauthorized()
        })?;
        let uid = data
            .claims
            .uid
            .as_deref()
            .and_then(|s| Uuid::parse_str(s).ok())
            .ok_or_else(ApiError::unauthorized)?;
        Ok(CurrentUser(uid))
    }
}

/// Authorization header first, `auth_token` cookie as fallback. A non-Bearer
/// Authorization header is ignored rather than shadowing the cookie.
fn token_from_parts(parts: &Parts) -> Option<String> {
    if let Some(h) = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        if let Some(rest) = h.strip_prefix("Bearer ") {
            if !rest.is_empty() {
                return Some(rest.to_string());
            }
        }
    }

    let cookie_header = parts
        .headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    for part in cookie_header.split(';') {
        let kv = part.trim();
        if let Some(rest) = kv.strip_prefix("auth_token=") {
            if !rest.is_empty() {
                return Some(rest.to_string());
            }
        }
    }
    None
}

fn auth_service(state: &ServerState) -> AuthService<SeaOrmAuthRepository> {
    let repo = Arc::new(SeaOrmAuthRepository { db: state.db.clone() });
    AuthService::new(
        repo,
        AuthConfig {
            jwt_secret: Some(state.auth.jwt_secret.clone()),
            password_algorithm: "argon2".into(),
        },
    )
}

fn map_auth_error(e: AuthError) -> ApiError {
    match e {
        AuthError::Validation(msg) => ApiError::bad_request(msg),
        AuthError::Conflict => ApiError::new(StatusCode::CONFLICT, "User already exists"),
        AuthError::Unauthorized | AuthError::NotFound => ApiError::unauthorized(),
        AuthError::HashError(detail) | AuthError::TokenError(detail) | AuthError::Repository(detail) => {
            tracing::error!(err = %detail, "auth failure");
            ApiError::internal("Authentication error")
        }
    }
}

#[utoipa::path(post, path = "/auth/register", tag = "auth", request_body = crate::openapi::RegisterRequest, responses((status = 200, description = "Registered"), (status = 400, description = "Bad Request"), (status = 409, description = "Conflict")))]
pub async fn register(State(state): State<ServerState>, Json(input): Json<RegisterInput>) -> Result<Json<RegisterOutput>, ApiError> {
    let user = auth_service(&state).register(input).await.map_err(map_auth_error)?;
    Ok(Json(RegisterOutput { user_id: user.id }))
}

#[utoipa::path(post, path = "/auth/login", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Logged In"), (status = 401, description = "Unauthorized")))]
pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    Json(input): Json<LoginInput>,
) -> Result<(CookieJar, Json<LoginOutput>), ApiError> {
    let session = auth_service(&state).login(input).await.map_err(map_auth_error)?;
    let user = session.user;
    let Some(token) = session.token else {
        return Err(ApiError::internal("token generation failed"));
    };

    let mut cookie = Cookie::new("auth_token", token.clone());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(false);
    cookie.set_same_site(axum_extra::extract::cookie::SameSite::Lax);
    let jar = jar.add(cookie);
    let out = LoginOutput { user_id: user.id, email: user.email, name: user.name, token };
    Ok((jar, Json(out)))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let jar = jar.remove(Cookie::from("auth_token"));
    (jar, StatusCode::NO_CONTENT)
}

pub async fn me(State(state): State<ServerState>, user: CurrentUser) -> Result<Json<MeOutput>, ApiError> {
    let found = models::user::Entity::find_by_id(user.0)
        .one(&state.db)
        .await
        .map_err(|e| {
            tracing::error!(err = %e, "me lookup failed");
            ApiError::internal("Authentication error")
        })?;
    // A token outliving its account is just an invalid session.
    let u = found.ok_or_else(ApiError::unauthorized)?;
    Ok(Json(MeOutput { user_id: u.id, email: u.email, name: u.name }))
}
