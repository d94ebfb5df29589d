use std::collections::HashSet;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use mongodb::{
    bson::{doc, oid::ObjectId},
    Client,
};

use crate::{
    config::AppConfig,
    db::mongo::{self, PRICING, ROUTES, VEHICLES},
    error::{AppError, AppResult},
    models::{
        pricing::{
            Discount, DiscountKind, PriceQuote, PriceTable, PriceTableCell, PriceTableRow,
            PricingMatrix, RateTable, PRICING_DOCUMENT_ID,
        },
        route::Route,
        vehicle::Vehicle,
    },
};

pub struct PricingService;

impl PricingService {
    /// Fare for a vehicle on a route: the matrix override when one is set, else the route's base rate.
    pub fn resolve_base_price(route: &Route, vehicle_id: &str, rates: &RateTable) -> f64 {
        rates
            .get(&route.id_hex())
            .and_then(|per_vehicle| per_vehicle.get(vehicle_id))
            .copied()
            .filter(|price| price.is_finite() && *price >= 0.0)
            .unwrap_or(route.base_rate)
    }

    /// Calendar date in the business timezone.
    pub fn business_today(now: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
        now.with_timezone(&offset).date_naive()
    }

    /// Both bounds are inclusive; a missing bound is open-ended.
    pub fn is_discount_active(discount: &Discount, today: NaiveDate) -> bool {
        if !discount.enabled {
            return false;
        }
        let started = discount.start_date.map_or(true, |start| start <= today);
        let not_ended = discount.end_date.map_or(true, |end| today <= end);
        started && not_ended
    }

    /// Percentage is clamped to [0, 100]; a fixed amount never exceeds the price.
    pub fn apply_discount(price: f64, kind: DiscountKind, value: f64) -> f64 {
        let price = price.max(0.0);
        let value = if value.is_finite() { value } else { 0.0 };
        let discounted = match kind {
            DiscountKind::Percentage => {
                let percent = value.clamp(0.0, 100.0);
                price - price * percent / 100.0
            }
            DiscountKind::Fixed => price - value.clamp(0.0, price),
        };
        round_currency(discounted.max(0.0))
    }

    pub fn quote(
        route: &Route,
        vehicle: &Vehicle,
        matrix: &PricingMatrix,
        today: NaiveDate,
        currency: &str,
    ) -> PriceQuote {
        let vehicle_id = vehicle.id_hex();
        let base_price = round_currency(Self::resolve_base_price(
            route,
            &vehicle_id,
            &matrix.custom_rates,
        ));

        let discount = &matrix.discount;
        let active = Self::is_discount_active(discount, today);
        let final_price = if active {
            Self::apply_discount(base_price, discount.kind, discount.value)
        } else {
            base_price
        };

        PriceQuote {
            route_id: route.id_hex(),
            vehicle_id,
            base_price,
            discount_amount: round_currency(base_price - final_price),
            final_price,
            currency: currency.to_string(),
            discount_applied: active && final_price < base_price,
            discount_label: if active { discount.label.clone() } else { None },
        }
    }

    /// Every route against every vehicle. Callers pass only what should be shown.
    pub fn build_table(
        routes: &[Route],
        vehicles: &[Vehicle],
        matrix: &PricingMatrix,
        today: NaiveDate,
        currency: &str,
    ) -> PriceTable {
        let mut routes: Vec<&Route> = routes.iter().collect();
        routes.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.name.cmp(&b.name)));

        let mut vehicles: Vec<&Vehicle> = vehicles.iter().collect();
        vehicles.sort_by(|a, b| {
            a.passenger_capacity
                .cmp(&b.passenger_capacity)
                .then_with(|| a.sort_order.cmp(&b.sort_order))
        });

        let rows = routes
            .into_iter()
            .map(|route| PriceTableRow {
                route_id: route.id_hex(),
                route_name: route.name.clone(),
                origin: route.origin.clone(),
                destination: route.destination.clone(),
                quotes: vehicles
                    .iter()
                    .map(|vehicle| {
                        let quote = Self::quote(route, vehicle, matrix, today, currency);
                        PriceTableCell {
                            vehicle_id: quote.vehicle_id,
                            vehicle_name: vehicle.name.clone(),
                            passenger_capacity: vehicle.passenger_capacity,
                            base_price: quote.base_price,
                            final_price: quote.final_price,
                        }
                    })
                    .collect(),
            })
            .collect();

        let discount = Self::is_discount_active(&matrix.discount, today)
            .then(|| matrix.discount.clone());

        PriceTable {
            currency: currency.to_string(),
            discount,
            rows,
        }
    }

    pub fn validate_discount(discount: &Discount) -> AppResult<()> {
        if !discount.value.is_finite() || discount.value < 0.0 {
            return Err(AppError::Validation(
                "Discount value must be a non-negative number".to_string(),
            ));
        }
        if discount.kind == DiscountKind::Percentage && discount.value > 100.0 {
            return Err(AppError::Validation(
                "Percentage discount cannot exceed 100".to_string(),
            ));
        }
        if let (Some(start), Some(end)) = (discount.start_date, discount.end_date) {
            if start > end {
                return Err(AppError::Validation(
                    "Discount start date must not be after its end date".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Rejects overrides that are negative or point at routes/vehicles that do not exist.
    pub fn validate_rate_table(
        rates: &RateTable,
        route_ids: &HashSet<String>,
        vehicle_ids: &HashSet<String>,
    ) -> AppResult<()> {
        for (route_id, per_vehicle) in rates {
            if !route_ids.contains(route_id) {
                return Err(AppError::Validation(format!("Unknown route {}", route_id)));
            }
            for (vehicle_id, price) in per_vehicle {
                if !vehicle_ids.contains(vehicle_id) {
                    return Err(AppError::Validation(format!(
                        "Unknown vehicle {}",
                        vehicle_id
                    )));
                }
                Self::validate_price(*price)?;
            }
        }
        Ok(())
    }

    /// Matrix keys are lowercase hex, the form `resolve_base_price` looks up.
    pub fn set_rate(rates: &mut RateTable, route_id: &ObjectId, vehicle_id: &ObjectId, price: f64) {
        rates
            .entry(route_id.to_hex())
            .or_default()
            .insert(vehicle_id.to_hex(), price);
    }

    pub fn clear_rate(rates: &mut RateTable, route_id: &ObjectId, vehicle_id: &ObjectId) -> bool {
        let removed = rates
            .get_mut(&route_id.to_hex())
            .and_then(|per_vehicle| per_vehicle.remove(&vehicle_id.to_hex()))
            .is_some();
        rates.retain(|_, per_vehicle| !per_vehicle.is_empty());
        removed
    }

    pub fn remove_route_rates(rates: &mut RateTable, route_id: &str) -> bool {
        rates.remove(route_id).is_some()
    }

    pub fn remove_vehicle_rates(rates: &mut RateTable, vehicle_id: &str) -> bool {
        let mut removed = false;
        for per_vehicle in rates.values_mut() {
            removed |= per_vehicle.remove(vehicle_id).is_some();
        }
        rates.retain(|_, per_vehicle| !per_vehicle.is_empty());
        removed
    }

    pub fn validate_price(price: f64) -> AppResult<()> {
        if price.is_finite() && price >= 0.0 {
            Ok(())
        } else {
            Err(AppError::Validation(
                "Price must be a non-negative number".to_string(),
            ))
        }
    }
}

pub fn round_currency(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

pub async fn load_matrix(client: &Client, config: &AppConfig) -> AppResult<PricingMatrix> {
    let matrix = mongo::collection::<PricingMatrix>(client, config, PRICING)
        .find_one(doc! { "_id": PRICING_DOCUMENT_ID })
        .await?;
    Ok(matrix.unwrap_or_default())
}

pub async fn save_matrix(
    client: &Client,
    config: &AppConfig,
    matrix: &PricingMatrix,
) -> AppResult<()> {
    mongo::collection::<PricingMatrix>(client, config, PRICING)
        .replace_one(doc! { "_id": PRICING_DOCUMENT_ID }, matrix)
        .upsert(true)
        .await?;
    Ok(())
}

pub async fn load_active_route(client: &Client, config: &AppConfig, id: &str) -> AppResult<Route> {
    let oid = mongo::parse_object_id(id)?;
    mongo::collection::<Route>(client, config, ROUTES)
        .find_one(doc! { "_id": oid, "active": true })
        .await?
        .ok_or_else(|| AppError::not_found("Route"))
}

pub async fn load_active_vehicle(
    client: &Client,
    config: &AppConfig,
    id: &str,
) -> AppResult<Vehicle> {
    let oid = mongo::parse_object_id(id)?;
    mongo::collection::<Vehicle>(client, config, VEHICLES)
        .find_one(doc! { "_id": oid, "active": true })
        .await?
        .ok_or_else(|| AppError::not_found("Vehicle"))
}

/// Prices a route/vehicle pair against the stored matrix as of `now`.
pub async fn quote_for(
    client: &Client,
    config: &AppConfig,
    route_id: &str,
    vehicle_id: &str,
    now: DateTime<Utc>,
) -> AppResult<(Route, Vehicle, PriceQuote)> {
    let (route, vehicle, matrix) = tokio::try_join!(
        load_active_route(client, config, route_id),
        load_active_vehicle(client, config, vehicle_id),
        load_matrix(client, config),
    )?;

    let today = PricingService::business_today(now, config.business_offset());
    let quote = PricingService::quote(&route, &vehicle, &matrix, today, &config.currency);
    Ok((route, vehicle, quote))
}
