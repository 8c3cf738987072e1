//! Itinerary entity and its embedded locations.
//!
//! Locations live inside the itinerary row as a JSONB array; they carry no
//! identity of their own and change only through a full-document update of the
//! parent. Serialized field names are camelCase to match the wire contract.

use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::user;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "itinerary")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub start_date: Date,
    pub end_date: Date,
    #[sea_orm(column_type = "JsonBinary")]
    pub locations: Json,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    User,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Geographic point of an embedded location.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// A point of interest embedded in an itinerary.
///
/// `weather_data` and `nearby_attractions` hold whatever the third-party
/// providers returned; their schemas are not modelled here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub name: String,
    pub address: String,
    pub coordinates: Coordinates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visit_date: Option<Date>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_data: Option<Json>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nearby_attractions: Option<Json>,
}

/// The mutable fields of an itinerary, used for both create and full-replace
/// update. The owner is never part of this set.
#[derive(Clone, Debug)]
pub struct ItineraryFields {
    pub title: String,
    pub description: Option<String>,
    pub start_date: Date,
    pub end_date: Date,
    pub locations: Vec<Location>,
}

pub fn validate_title(title: &str) -> Result<(), ModelError> {
    if title.trim().is_empty() {
        return Err(ModelError::Validation("title required".into()));
    }
    Ok(())
}

pub fn validate_date_range(start: Date, end: Date) -> Result<(), ModelError> {
    if start > end {
        return Err(ModelError::Validation("start date must not be after end date".into()));
    }
    Ok(())
}

pub fn locations_to_json(locations: &[Location]) -> Result<Json, ModelError> {
    serde_json::to_value(locations).map_err(|e| ModelError::Validation(e.to_string()))
}

pub async fn list_by_user(db: &DatabaseConnection, user_id: Uuid) -> Result<Vec<Model>, ModelError> {
    Entity::find()
        .filter(Column::UserId.eq(user_id))
        .all(db)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))
}

pub async fn find_by_id(db: &DatabaseConnection, id: Uuid) -> Result<Option<Model>, ModelError> {
    Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))
}

pub async fn create(db: &DatabaseConnection, user_id: Uuid, fields: ItineraryFields) -> Result<Model, ModelError> {
    validate_title(&fields.title)?;
    validate_date_range(fields.start_date, fields.end_date)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        title: Set(fields.title),
        description: Set(fields.description),
        start_date: Set(fields.start_date),
        end_date: Set(fields.end_date),
        locations: Set(locations_to_json(&fields.locations)?),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| ModelError::Db(e.to_string()))
}

/// Full replace of the mutable fields; `user_id` and `created_at` are left
/// untouched. Returns `None` when no row matches.
pub async fn update_by_id(db: &DatabaseConnection, id: Uuid, fields: ItineraryFields) -> Result<Option<Model>, ModelError> {
    validate_title(&fields.title)?;
    validate_date_range(fields.start_date, fields.end_date)?;
    let Some(existing) = find_by_id(db, id).await? else {
        return Ok(None);
    };
    let mut am: ActiveModel = existing.into();
    am.title = Set(fields.title);
    am.description = Set(fields.description);
    am.start_date = Set(fields.start_date);
    am.end_date = Set(fields.end_date);
    am.locations = Set(locations_to_json(&fields.locations)?);
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await.map_err(|e| ModelError::Db(e.to_string()))?;
    Ok(Some(updated))
}

/// Returns true if a row was removed.
pub async fn delete_by_id(db: &DatabaseConnection, id: Uuid) -> Result<bool, ModelError> {
    let res = Entity::delete_by_id(id)
        .exec(db)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))?;
    Ok(res.rows_affected > 0)
}
