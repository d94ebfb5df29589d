use actix_web::{web, HttpResponse};
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{bson::doc, Client};
use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::mongo::{self, ROUTES, VEHICLES},
    error::{AppError, AppResult},
    models::{pricing::QuoteQuery, route::Route, vehicle::Vehicle},
    services::pricing_service::{self, PricingService},
};

/*
    GET /api/pricing/quote?route_id=..&vehicle_id=..
*/
pub async fn get_quote(
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    params: web::Query<QuoteQuery>,
) -> AppResult<HttpResponse> {
    let (_, _, quote) = pricing_service::quote_for(
        &data,
        &config,
        &params.route_id,
        &params.vehicle_id,
        Utc::now(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(quote))
}

/*
    GET /api/pricing/table
*/
pub async fn get_price_table(
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
) -> AppResult<HttpResponse> {
    let routes_collection = mongo::collection::<Route>(&data, &config, ROUTES);
    let vehicles_collection = mongo::collection::<Vehicle>(&data, &config, VEHICLES);

    let load_routes = async {
        let routes: Vec<Route> = routes_collection
            .find(doc! { "active": true })
            .await?
            .try_collect()
            .await?;
        Ok::<_, AppError>(routes)
    };
    let load_vehicles = async {
        let vehicles: Vec<Vehicle> = vehicles_collection
            .find(doc! { "active": true })
            .await?
            .try_collect()
            .await?;
        Ok::<_, AppError>(vehicles)
    };

    let (routes, vehicles, matrix) = tokio::try_join!(
        load_routes,
        load_vehicles,
        pricing_service::load_matrix(&data, &config),
    )?;

    let today = PricingService::business_today(Utc::now(), config.business_offset());
    let table = PricingService::build_table(&routes, &vehicles, &matrix, today, &config.currency);
    Ok(HttpResponse::Ok().json(table))
}

/*
    GET /api/pricing/discount
    The discount currently in force, or null.
*/
pub async fn get_active_discount(
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
) -> AppResult<HttpResponse> {
    let matrix = pricing_service::load_matrix(&data, &config).await?;
    let today = PricingService::business_today(Utc::now(), config.business_offset());

    let active = PricingService::is_discount_active(&matrix.discount, today).then_some(matrix.discount);
    Ok(HttpResponse::Ok().json(active))
}
