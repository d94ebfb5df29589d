use actix_web::{web, HttpResponse};
use chrono::Utc;
use futures::TryStreamExt;
use log::info;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    Client,
};
use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::mongo::{self, parse_object_id, ROUTES, VEHICLES},
    error::{AppError, AppResult},
    middleware::auth_context::AuthenticatedUser,
    models::{
        audit::AuditAction,
        pricing::{Discount, PricingMatrix, RateInput, RateTable},
    },
    services::{
        audit_service,
        pricing_service::{self, round_currency, PricingService},
    },
};

async fn existing_ids(client: &Client, config: &AppConfig, name: &str) -> AppResult<HashSet<String>> {
    let docs: Vec<Document> = mongo::collection::<Document>(client, config, name)
        .find(doc! {})
        .projection(doc! { "_id": 1 })
        .await?
        .try_collect()
        .await?;

    Ok(docs
        .iter()
        .filter_map(|d| d.get_object_id("_id").ok())
        .map(|id| id.to_hex())
        .collect())
}

async fn ensure_exists(
    client: &Client,
    config: &AppConfig,
    name: &str,
    what: &str,
    id: &str,
) -> AppResult<ObjectId> {
    let oid = parse_object_id(id)?;
    mongo::collection::<Document>(client, config, name)
        .find_one(doc! { "_id": oid })
        .await?
        .map(|_| oid)
        .ok_or_else(|| AppError::not_found(what))
}

/// Keys as `resolve_base_price` reads them: trimmed lowercase hex.
fn normalize_keys(rates: RateTable) -> RateTable {
    let key = |id: String| id.trim().to_lowercase();
    let mut normalized = RateTable::new();
    for (route_id, per_vehicle) in rates {
        let row = normalized.entry(key(route_id)).or_default();
        for (vehicle_id, price) in per_vehicle {
            row.insert(key(vehicle_id), price);
        }
    }
    normalized
}

async fn save_and_audit(
    client: &Client,
    config: &AppConfig,
    user: &AuthenticatedUser,
    mut matrix: PricingMatrix,
    summary: String,
) -> AppResult<PricingMatrix> {
    matrix.updated_at = Some(Utc::now());
    matrix.updated_by = Some(user.email().to_string());
    pricing_service::save_matrix(client, config, &matrix).await?;

    info!("Pricing changed by {}: {}", user.email(), summary);
    audit_service::record(
        client,
        config,
        user.claims(),
        AuditAction::Update,
        "pricing",
        Some(matrix.id.clone()),
        summary,
    )
    .await;
    Ok(matrix)
}

/*
    GET /api/admin/pricing
*/
pub async fn get_matrix(
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
) -> AppResult<HttpResponse> {
    let matrix = pricing_service::load_matrix(&data, &config).await?;
    Ok(HttpResponse::Ok().json(matrix))
}

/*
    PUT /api/admin/pricing/rates
    Replaces every custom rate at once.
*/
pub async fn replace_rates(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    input: web::Json<RateTable>,
) -> AppResult<HttpResponse> {
    let mut rates = normalize_keys(input.into_inner());
    rates.retain(|_, per_vehicle| !per_vehicle.is_empty());

    let (route_ids, vehicle_ids, mut matrix) = tokio::try_join!(
        existing_ids(&data, &config, ROUTES),
        existing_ids(&data, &config, VEHICLES),
        pricing_service::load_matrix(&data, &config),
    )?;
    PricingService::validate_rate_table(&rates, &route_ids, &vehicle_ids)?;

    for per_vehicle in rates.values_mut() {
        for price in per_vehicle.values_mut() {
            *price = round_currency(*price);
        }
    }
    let cells: usize = rates.values().map(|per_vehicle| per_vehicle.len()).sum();
    matrix.custom_rates = rates;

    let matrix = save_and_audit(
        &data,
        &config,
        &user,
        matrix,
        format!("Replaced custom rates ({} overrides)", cells),
    )
    .await?;
    Ok(HttpResponse::Ok().json(matrix))
}

/*
    PUT /api/admin/pricing/rates/{route_id}/{vehicle_id}
*/
pub async fn set_rate(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    path: web::Path<(String, String)>,
    input: web::Json<RateInput>,
) -> AppResult<HttpResponse> {
    let (route_id, vehicle_id) = path.into_inner();
    PricingService::validate_price(input.price)?;

    let (route_id, vehicle_id, mut matrix) = tokio::try_join!(
        ensure_exists(&data, &config, ROUTES, "Route", &route_id),
        ensure_exists(&data, &config, VEHICLES, "Vehicle", &vehicle_id),
        pricing_service::load_matrix(&data, &config),
    )?;

    let price = round_currency(input.price);
    PricingService::set_rate(&mut matrix.custom_rates, &route_id, &vehicle_id, price);

    let matrix = save_and_audit(
        &data,
        &config,
        &user,
        matrix,
        format!("Set rate {} for route {} / vehicle {}", price, route_id, vehicle_id),
    )
    .await?;
    Ok(HttpResponse::Ok().json(matrix))
}

/*
    DELETE /api/admin/pricing/rates/{route_id}/{vehicle_id}
    The pair falls back to the route's base rate.
*/
pub async fn clear_rate(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    path: web::Path<(String, String)>,
) -> AppResult<HttpResponse> {
    let (route_id, vehicle_id) = path.into_inner();
    let route_id = parse_object_id(&route_id)?;
    let vehicle_id = parse_object_id(&vehicle_id)?;
    let mut matrix = pricing_service::load_matrix(&data, &config).await?;

    if !PricingService::clear_rate(&mut matrix.custom_rates, &route_id, &vehicle_id) {
        return Err(AppError::not_found("Custom rate"));
    }

    let matrix = save_and_audit(
        &data,
        &config,
        &user,
        matrix,
        format!("Cleared rate for route {} / vehicle {}", route_id, vehicle_id),
    )
    .await?;
    Ok(HttpResponse::Ok().json(matrix))
}

/*
    PUT /api/admin/pricing/discount
*/
pub async fn set_discount(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    input: web::Json<Discount>,
) -> AppResult<HttpResponse> {
    let mut discount = input.into_inner();
    PricingService::validate_discount(&discount)?;
    discount.label = discount
        .label
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty());

    let mut matrix = pricing_service::load_matrix(&data, &config).await?;
    let summary = if discount.enabled {
        format!("Discount set to {:?} {}", discount.kind, discount.value)
    } else {
        "Discount disabled".to_string()
    };
    matrix.discount = discount;

    let matrix = save_and_audit(&data, &config, &user, matrix, summary).await?;
    Ok(HttpResponse::Ok().json(matrix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaced_rates_are_keyed_by_lowercase_hex() {
        let mut rates = RateTable::new();
        rates
            .entry(" 65F1C0FFEE0000000000AA01 ".to_string())
            .or_default()
            .insert("65F1C0FFEE0000000000BB01".to_string(), 180.0);

        let rates = normalize_keys(rates);
        assert_eq!(rates["65f1c0ffee0000000000aa01"]["65f1c0ffee0000000000bb01"], 180.0);
    }
}
