use actix_web::{web, HttpResponse};
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{bson::doc, Client};
use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::mongo::{self, parse_object_id, ROUTES},
    error::{AppError, AppResult},
    middleware::auth_context::AuthenticatedUser,
    models::{
        audit::AuditAction,
        route::{Route, RouteInput},
    },
    services::{
        audit_service,
        pricing_service::{self, PricingService},
        validation::{require_text, resolve_slug},
    },
};

pub fn validate_route(input: &RouteInput) -> AppResult<()> {
    require_text("Name", &input.name)?;
    require_text("Origin", &input.origin)?;
    require_text("Destination", &input.destination)?;
    PricingService::validate_price(input.base_rate)?;
    if input.distance_km.is_some_and(|km| !km.is_finite() || km < 0.0) {
        return Err(AppError::Validation(
            "Distance must be a non-negative number".to_string(),
        ));
    }
    Ok(())
}

fn slug_conflict(err: AppError, slug: &str) -> AppError {
    if err.is_duplicate_key() {
        AppError::Conflict(format!("A route with slug '{}' already exists", slug))
    } else {
        err
    }
}

/*
    GET /api/admin/routes
*/
pub async fn list_all(
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
) -> AppResult<HttpResponse> {
    let routes: Vec<Route> = mongo::collection::<Route>(&data, &config, ROUTES)
        .find(doc! {})
        .sort(doc! { "sort_order": 1, "name": 1 })
        .await?
        .try_collect()
        .await?;
    Ok(HttpResponse::Ok().json(routes))
}

/*
    POST /api/admin/routes
*/
pub async fn create_route(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    input: web::Json<RouteInput>,
) -> AppResult<HttpResponse> {
    let input = input.into_inner();
    validate_route(&input)?;
    let slug = resolve_slug(input.slug.as_deref(), &input.name)?;

    let now = Utc::now();
    let mut route = Route {
        id: None,
        slug,
        name: input.name.trim().to_string(),
        origin: input.origin.trim().to_string(),
        destination: input.destination.trim().to_string(),
        distance_km: input.distance_km,
        duration_minutes: input.duration_minutes,
        base_rate: pricing_service::round_currency(input.base_rate),
        description: input.description,
        stops: input.stops,
        active: input.active.unwrap_or(true),
        sort_order: input.sort_order.unwrap_or(0),
        created_at: Some(now),
        updated_at: Some(now),
    };

    let result = mongo::collection::<Route>(&data, &config, ROUTES)
        .insert_one(&route)
        .await
        .map_err(|e| slug_conflict(e.into(), &route.slug))?;
    route.id = result.inserted_id.as_object_id();

    audit_service::record(
        &data,
        &config,
        user.claims(),
        AuditAction::Create,
        "route",
        Some(route.id_hex()),
        format!("Created route {}", route.name),
    )
    .await;

    Ok(HttpResponse::Created().json(route))
}

/*
    PUT /api/admin/routes/{id}
*/
pub async fn update_route(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    path: web::Path<String>,
    input: web::Json<RouteInput>,
) -> AppResult<HttpResponse> {
    let input = input.into_inner();
    validate_route(&input)?;
    let oid = parse_object_id(&path.into_inner())?;

    let collection = mongo::collection::<Route>(&data, &config, ROUTES);
    let existing = collection
        .find_one(doc! { "_id": oid })
        .await?
        .ok_or_else(|| AppError::not_found("Route"))?;

    // Keep the published slug unless one is supplied.
    let slug = match input.slug.as_deref() {
        Some(_) => resolve_slug(input.slug.as_deref(), &input.name)?,
        None => existing.slug.clone(),
    };

    let route = Route {
        slug,
        name: input.name.trim().to_string(),
        origin: input.origin.trim().to_string(),
        destination: input.destination.trim().to_string(),
        distance_km: input.distance_km,
        duration_minutes: input.duration_minutes,
        base_rate: pricing_service::round_currency(input.base_rate),
        description: input.description,
        stops: input.stops,
        active: input.active.unwrap_or(existing.active),
        sort_order: input.sort_order.unwrap_or(existing.sort_order),
        updated_at: Some(Utc::now()),
        ..existing
    };

    collection
        .replace_one(doc! { "_id": oid }, &route)
        .await
        .map_err(|e| slug_conflict(e.into(), &route.slug))?;

    audit_service::record(
        &data,
        &config,
        user.claims(),
        AuditAction::Update,
        "route",
        Some(oid.to_hex()),
        format!("Updated route {}", route.name),
    )
    .await;

    Ok(HttpResponse::Ok().json(route))
}

/*
    DELETE /api/admin/routes/{id}
    Also drops the route's row from the pricing matrix.
*/
pub async fn delete_route(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let oid = parse_object_id(&path.into_inner())?;
    let route = mongo::collection::<Route>(&data, &config, ROUTES)
        .find_one_and_delete(doc! { "_id": oid })
        .await?
        .ok_or_else(|| AppError::not_found("Route"))?;

    let mut matrix = pricing_service::load_matrix(&data, &config).await?;
    if PricingService::remove_route_rates(&mut matrix.custom_rates, &oid.to_hex()) {
        matrix.updated_at = Some(Utc::now());
        matrix.updated_by = Some(user.email().to_string());
        pricing_service::save_matrix(&data, &config, &matrix).await?;
    }

    audit_service::record(
        &data,
        &config,
        user.claims(),
        AuditAction::Delete,
        "route",
        Some(oid.to_hex()),
        format!("Deleted route {}", route.name),
    )
    .await;

    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> RouteInput {
        RouteInput {
            slug: None,
            name: "Makkah to Madinah".to_string(),
            origin: "Makkah".to_string(),
            destination: "Madinah".to_string(),
            distance_km: Some(450.0),
            duration_minutes: Some(270),
            base_rate: 650.0,
            description: None,
            stops: vec![],
            active: None,
            sort_order: None,
        }
    }

    #[test]
    fn accepts_a_complete_route() {
        assert!(validate_route(&input()).is_ok());
    }

    #[test]
    fn rejects_negative_rates_and_missing_endpoints() {
        let negative = RouteInput {
            base_rate: -10.0,
            ..input()
        };
        assert!(validate_route(&negative).is_err());

        let no_origin = RouteInput {
            origin: "  ".to_string(),
            ..input()
        };
        assert!(validate_route(&no_origin).is_err());

        let bad_distance = RouteInput {
            distance_km: Some(f64::NAN),
            ..input()
        };
        assert!(validate_route(&bad_distance).is_err());
    }
}
