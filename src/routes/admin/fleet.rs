use actix_web::{web, HttpResponse};
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{bson::doc, Client};
use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::mongo::{self, parse_object_id, VEHICLES},
    error::{AppError, AppResult},
    middleware::auth_context::AuthenticatedUser,
    models::{
        audit::AuditAction,
        vehicle::{Vehicle, VehicleInput},
    },
    services::{
        audit_service,
        pricing_service::{self, PricingService},
        validation::require_text,
    },
};

pub fn validate_vehicle(input: &VehicleInput) -> AppResult<()> {
    require_text("Name", &input.name)?;
    if input.passenger_capacity < 1 {
        return Err(AppError::Validation(
            "Passenger capacity must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn clean_features(features: Vec<String>) -> Vec<String> {
    features
        .into_iter()
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .collect()
}

/*
    GET /api/admin/fleet
*/
pub async fn list_all(
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
) -> AppResult<HttpResponse> {
    let vehicles: Vec<Vehicle> = mongo::collection::<Vehicle>(&data, &config, VEHICLES)
        .find(doc! {})
        .sort(doc! { "sort_order": 1, "passenger_capacity": 1 })
        .await?
        .try_collect()
        .await?;
    Ok(HttpResponse::Ok().json(vehicles))
}

/*
    POST /api/admin/fleet
*/
pub async fn create_vehicle(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    input: web::Json<VehicleInput>,
) -> AppResult<HttpResponse> {
    let input = input.into_inner();
    validate_vehicle(&input)?;

    let now = Utc::now();
    let mut vehicle = Vehicle {
        id: None,
        name: input.name.trim().to_string(),
        category: input.category,
        passenger_capacity: input.passenger_capacity,
        luggage_capacity: input.luggage_capacity,
        features: clean_features(input.features),
        image_url: input.image_url,
        active: input.active.unwrap_or(true),
        sort_order: input.sort_order.unwrap_or(0),
        created_at: Some(now),
        updated_at: Some(now),
    };

    let result = mongo::collection::<Vehicle>(&data, &config, VEHICLES)
        .insert_one(&vehicle)
        .await?;
    vehicle.id = result.inserted_id.as_object_id();

    audit_service::record(
        &data,
        &config,
        user.claims(),
        AuditAction::Create,
        "vehicle",
        Some(vehicle.id_hex()),
        format!("Added vehicle {}", vehicle.name),
    )
    .await;

    Ok(HttpResponse::Created().json(vehicle))
}

/*
    PUT /api/admin/fleet/{id}
*/
pub async fn update_vehicle(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    path: web::Path<String>,
    input: web::Json<VehicleInput>,
) -> AppResult<HttpResponse> {
    let input = input.into_inner();
    validate_vehicle(&input)?;
    let oid = parse_object_id(&path.into_inner())?;

    let collection = mongo::collection::<Vehicle>(&data, &config, VEHICLES);
    let existing = collection
        .find_one(doc! { "_id": oid })
        .await?
        .ok_or_else(|| AppError::not_found("Vehicle"))?;

    let vehicle = Vehicle {
        name: input.name.trim().to_string(),
        category: input.category,
        passenger_capacity: input.passenger_capacity,
        luggage_capacity: input.luggage_capacity,
        features: clean_features(input.features),
        image_url: input.image_url,
        active: input.active.unwrap_or(existing.active),
        sort_order: input.sort_order.unwrap_or(existing.sort_order),
        updated_at: Some(Utc::now()),
        ..existing
    };
    collection.replace_one(doc! { "_id": oid }, &vehicle).await?;

    audit_service::record(
        &data,
        &config,
        user.claims(),
        AuditAction::Update,
        "vehicle",
        Some(oid.to_hex()),
        format!("Updated vehicle {}", vehicle.name),
    )
    .await;

    Ok(HttpResponse::Ok().json(vehicle))
}

/*
    DELETE /api/admin/fleet/{id}
    Also drops the vehicle's column from the pricing matrix.
*/
pub async fn delete_vehicle(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let oid = parse_object_id(&path.into_inner())?;
    let vehicle = mongo::collection::<Vehicle>(&data, &config, VEHICLES)
        .find_one_and_delete(doc! { "_id": oid })
        .await?
        .ok_or_else(|| AppError::not_found("Vehicle"))?;

    let mut matrix = pricing_service::load_matrix(&data, &config).await?;
    if PricingService::remove_vehicle_rates(&mut matrix.custom_rates, &oid.to_hex()) {
        matrix.updated_at = Some(Utc::now());
        matrix.updated_by = Some(user.email().to_string());
        pricing_service::save_matrix(&data, &config, &matrix).await?;
    }

    audit_service::record(
        &data,
        &config,
        user.claims(),
        AuditAction::Delete,
        "vehicle",
        Some(oid.to_hex()),
        format!("Removed vehicle {}", vehicle.name),
    )
    .await;

    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::vehicle::VehicleCategory;

    fn input(capacity: u32) -> VehicleInput {
        VehicleInput {
            name: "GMC Yukon".to_string(),
            category: VehicleCategory::Suv,
            passenger_capacity: capacity,
            luggage_capacity: 5,
            features: vec![" Wi-Fi ".to_string(), "".to_string()],
            image_url: None,
            active: None,
            sort_order: None,
        }
    }

    #[test]
    fn capacity_must_be_positive() {
        assert!(validate_vehicle(&input(7)).is_ok());
        assert!(matches!(
            validate_vehicle(&input(0)),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn features_are_trimmed() {
        assert_eq!(clean_features(input(7).features), vec!["Wi-Fi".to_string()]);
    }
}
