use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct RegisterRequest { pub email: String, pub name: String, pub password: String }

#[derive(ToSchema)]
pub struct LoginRequest { pub email: String, pub password: String }

#[derive(ToSchema)]
pub struct CoordinatesDoc { pub lat: f64, pub lng: f64 }

#[derive(ToSchema)]
pub struct LocationDoc {
    pub name: String,
    pub address: String,
    pub coordinates: CoordinatesDoc,
    #[schema(example = "2024-06-02")]
    pub visit_date: Option<String>,
    pub notes: Option<String>,
}

#[derive(ToSchema)]
pub struct ItineraryRequest {
    pub title: String,
    pub description: Option<String>,
    #[schema(example = "2024-06-01")]
    pub start_date: String,
    #[schema(example = "2024-06-10")]
    pub end_date: String,
    pub locations: Vec<LocationDoc>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::auth::register,
        crate::auth::login,
        crate::routes::itineraries::list,
        crate::routes::itineraries::create,
        crate::routes::itineraries::get,
        crate::routes::itineraries::update,
        crate::routes::itineraries::delete,
        crate::routes::places::nearby_places,
        crate::routes::weather::weather,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            CoordinatesDoc,
            LocationDoc,
            ItineraryRequest,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "itineraries"),
        (name = "gateway")
    )
)]
pub struct ApiDoc;
