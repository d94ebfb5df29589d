use actix_web::{web, HttpResponse};
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId},
    Client,
};
use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::mongo::{self, VEHICLES},
    error::{AppError, AppResult},
    models::vehicle::Vehicle,
};

#[derive(serde::Deserialize)]
pub struct FleetQuery {
    min_passengers: Option<u32>,
}

/*
    GET /api/fleet
*/
pub async fn list_vehicles(
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    params: web::Query<FleetQuery>,
) -> AppResult<HttpResponse> {
    let mut filter = doc! { "active": true };
    if let Some(min) = params.min_passengers {
        filter.insert("passenger_capacity", doc! { "$gte": min as i64 });
    }

    let vehicles: Vec<Vehicle> = mongo::collection::<Vehicle>(&data, &config, VEHICLES)
        .find(filter)
        .sort(doc! { "passenger_capacity": 1, "sort_order": 1 })
        .await?
        .try_collect()
        .await?;

    Ok(HttpResponse::Ok().json(vehicles))
}

/*
    GET /api/fleet/{id}
*/
pub async fn get_vehicle(
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let oid = ObjectId::parse_str(&id).map_err(|_| AppError::invalid_id(&id))?;

    let vehicle = mongo::collection::<Vehicle>(&data, &config, VEHICLES)
        .find_one(doc! { "_id": oid, "active": true })
        .await?
        .ok_or_else(|| AppError::not_found("Vehicle"))?;

    Ok(HttpResponse::Ok().json(vehicle))
}
