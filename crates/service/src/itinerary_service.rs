//! Itinerary operations scoped to an owning user.
//!
//! Every operation takes the caller identity resolved by the web layer.
//! Existence is confirmed before ownership: a caller asking for somebody
//! else's itinerary gets `Forbidden`, not `NotFound`. Field validation lives
//! in `models::itinerary` and is enforced here for create and update alike,
//! regardless of what any client-side form already checked.

use sea_orm::DatabaseConnection;
use tracing::info;
use uuid::Uuid;

use models::itinerary::{self, ItineraryFields, Model};

use crate::errors::ServiceError;

/// List all itineraries owned by the caller; empty when there are none.
pub async fn list_itineraries(db: &DatabaseConnection, owner: Uuid) -> Result<Vec<Model>, ServiceError> {
    let rows = itinerary::list_by_user(db, owner).await?;
    Ok(rows)
}

/// Fetch one itinerary; the caller must own it.
pub async fn get_itinerary(db: &DatabaseConnection, caller: Uuid, id: Uuid) -> Result<Model, ServiceError> {
    let found = itinerary::find_by_id(db, id).await?;
    let Some(model) = found else { return Err(ServiceError::not_found("itinerary")); };
    ensure_owner(&model, caller)?;
    Ok(model)
}

/// Create an itinerary owned by the caller.
pub async fn create_itinerary(
    db: &DatabaseConnection,
    caller: Uuid,
    fields: ItineraryFields,
) -> Result<Model, ServiceError> {
    let created = itinerary::create(db, caller, fields).await?;
    info!(id = %created.id, user_id = %caller, title = %created.title, "itinerary_created");
    Ok(created)
}

/// Full replace of the mutable fields; ownership is checked first and the
/// owner reference itself is never rewritten.
pub async fn update_itinerary(
    db: &DatabaseConnection,
    caller: Uuid,
    id: Uuid,
    fields: ItineraryFields,
) -> Result<Model, ServiceError> {
    let found = itinerary::find_by_id(db, id).await?;
    let Some(existing) = found else { return Err(ServiceError::not_found("itinerary")); };
    ensure_owner(&existing, caller)?;
    let updated = itinerary::update_by_id(db, id, fields)
        .await?
        .ok_or_else(|| ServiceError::not_found("itinerary"))?;
    info!(id = %updated.id, user_id = %caller, "itinerary_updated");
    Ok(updated)
}

/// Delete an itinerary the caller owns. A second delete of the same id
/// reports `NotFound`.
pub async fn delete_itinerary(db: &DatabaseConnection, caller: Uuid, id: Uuid) -> Result<(), ServiceError> {
    let found = itinerary::find_by_id(db, id).await?;
    let Some(existing) = found else { return Err(ServiceError::not_found("itinerary")); };
    ensure_owner(&existing, caller)?;
    let deleted = itinerary::delete_by_id(db, id).await?;
    if !deleted {
        return Err(ServiceError::not_found("itinerary"));
    }
    info!(id = %id, user_id = %caller, "itinerary_deleted");
    Ok(())
}

fn ensure_owner(model: &Model, caller: Uuid) -> Result<(), ServiceError> {
    if model.user_id != caller {
        return Err(ServiceError::Forbidden);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;
    use chrono::NaiveDate;
    use models::itinerary::{Coordinates, Location};
    use models::user;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("test date")
    }

    fn paris_fields() -> ItineraryFields {
        ItineraryFields {
            title: "Paris Trip".into(),
            description: Some("Long weekend".into()),
            start_date: date("2024-06-01"),
            end_date: date("2024-06-10"),
            locations: vec![Location {
                name: "Louvre".into(),
                address: "Rue de Rivoli, Paris".into(),
                coordinates: Coordinates { lat: 48.8606, lng: 2.3376 },
                visit_date: Some(date("2024-06-02")),
                notes: None,
                weather_data: None,
                nearby_attractions: None,
            }],
        }
    }

    async fn fresh_user(db: &sea_orm::DatabaseConnection) -> user::Model {
        user::create(db, &format!("svc_{}@example.com", Uuid::new_v4()), "Svc Tester")
            .await
            .expect("create user")
    }

    #[tokio::test]
    async fn crud_round_trip_preserves_fields() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let owner = fresh_user(&db).await;

        let created = create_itinerary(&db, owner.id, paris_fields()).await?;
        assert_eq!(created.user_id, owner.id);

        let fetched = get_itinerary(&db, owner.id, created.id).await?;
        assert_eq!(fetched.title, "Paris Trip");
        assert_eq!(fetched.description.as_deref(), Some("Long weekend"));
        assert_eq!(fetched.start_date, date("2024-06-01"));
        assert_eq!(fetched.end_date, date("2024-06-10"));
        let locations: Vec<Location> = serde_json::from_value(fetched.locations.clone())?;
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].name, "Louvre");

        delete_itinerary(&db, owner.id, created.id).await?;
        Ok(())
    }

    #[tokio::test]
    async fn ownership_is_checked_after_existence() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let owner = fresh_user(&db).await;
        let intruder = fresh_user(&db).await;

        let created = create_itinerary(&db, owner.id, paris_fields()).await?;

        // Existing but foreign: Forbidden, never NotFound.
        assert!(matches!(
            get_itinerary(&db, intruder.id, created.id).await,
            Err(ServiceError::Forbidden)
        ));
        assert!(matches!(
            update_itinerary(&db, intruder.id, created.id, paris_fields()).await,
            Err(ServiceError::Forbidden)
        ));
        assert!(matches!(
            delete_itinerary(&db, intruder.id, created.id).await,
            Err(ServiceError::Forbidden)
        ));

        // Absent id: NotFound for anyone.
        assert!(matches!(
            get_itinerary(&db, intruder.id, Uuid::new_v4()).await,
            Err(ServiceError::NotFound(_))
        ));

        delete_itinerary(&db, owner.id, created.id).await?;
        Ok(())
    }

    #[tokio::test]
    async fn delete_twice_reports_not_found() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let owner = fresh_user(&db).await;

        let created = create_itinerary(&db, owner.id, paris_fields()).await?;
        delete_itinerary(&db, owner.id, created.id).await?;
        assert!(matches!(
            delete_itinerary(&db, owner.id, created.id).await,
            Err(ServiceError::NotFound(_))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn inverted_date_range_rejected_on_create_and_update() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let owner = fresh_user(&db).await;

        let mut bad = paris_fields();
        bad.start_date = date("2024-06-10");
        bad.end_date = date("2024-06-01");
        assert!(matches!(
            create_itinerary(&db, owner.id, bad.clone()).await,
            Err(ServiceError::Validation(_))
        ));

        let created = create_itinerary(&db, owner.id, paris_fields()).await?;
        assert!(matches!(
            update_itinerary(&db, owner.id, created.id, bad).await,
            Err(ServiceError::Validation(_))
        ));

        // Nothing was replaced by the rejected update.
        let still = get_itinerary(&db, owner.id, created.id).await?;
        assert_eq!(still.start_date, date("2024-06-01"));

        delete_itinerary(&db, owner.id, created.id).await?;
        Ok(())
    }

    #[tokio::test]
    async fn update_never_rewrites_the_owner() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let owner = fresh_user(&db).await;

        let created = create_itinerary(&db, owner.id, paris_fields()).await?;
        let mut changed = paris_fields();
        changed.title = "Paris Trip, revised".into();
        let updated = update_itinerary(&db, owner.id, created.id, changed).await?;
        assert_eq!(updated.user_id, owner.id);
        assert_eq!(updated.title, "Paris Trip, revised");
        assert_eq!(updated.created_at, created.created_at);

        delete_itinerary(&db, owner.id, created.id).await?;
        Ok(())
    }
}
