use actix_web::{web, HttpResponse};
use chrono::Utc;
use log::{info, warn};
use mongodb::{bson::doc, Client};
use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::mongo::{self, BOOKINGS},
    error::{AppError, AppResult},
    models::bookings::{
        Booking, BookingConfirmation, BookingInput, BookingSource, BookingStatus, Customer,
        LookupQuery, QuickBookingInput, StatusChange,
    },
    services::{booking_service, pricing_service, settings_service},
};

const REFERENCE_ATTEMPTS: usize = 3;

/*
    POST /api/bookings
    The multi-step booking wizard submits here once the customer confirms.
*/
pub async fn create_booking(
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    input: web::Json<BookingInput>,
) -> AppResult<HttpResponse> {
    let booking = place_booking(&data, &config, input.into_inner(), BookingSource::Wizard).await?;
    Ok(HttpResponse::Created().json(BookingConfirmation::from(&booking)))
}

/*
    POST /api/bookings/quick
*/
pub async fn create_quick_booking(
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    input: web::Json<QuickBookingInput>,
) -> AppResult<HttpResponse> {
    let booking = place_booking(
        &data,
        &config,
        BookingInput::from(input.into_inner()),
        BookingSource::Quick,
    )
    .await?;
    Ok(HttpResponse::Created().json(BookingConfirmation::from(&booking)))
}

/*
    GET /api/bookings/{reference}?email=..  (or ?phone=..)
*/
pub async fn lookup_booking(
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    path: web::Path<String>,
    params: web::Query<LookupQuery>,
) -> AppResult<HttpResponse> {
    let reference = path.into_inner().trim().to_uppercase();
    if params.email.is_none() && params.phone.is_none() {
        return Err(AppError::BadRequest(
            "Provide the email or phone used for the booking".to_string(),
        ));
    }

    let booking = mongo::collection::<Booking>(&data, &config, BOOKINGS)
        .find_one(doc! { "reference": &reference })
        .await?
        .filter(|booking| {
            booking_service::matches_contact(
                booking,
                params.email.as_deref(),
                params.phone.as_deref(),
            )
        })
        // Same answer whether the reference or the contact detail was wrong.
        .ok_or_else(|| AppError::not_found("Booking"))?;

    Ok(HttpResponse::Ok().json(BookingConfirmation::from(&booking)))
}

async fn place_booking(
    client: &Client,
    config: &AppConfig,
    input: BookingInput,
    source: BookingSource,
) -> AppResult<Booking> {
    booking_service::validate_contact(&input, source)?;

    let now = Utc::now();
    let (settings, (route, vehicle, quote)) = tokio::try_join!(
        settings_service::load_settings(client, config),
        pricing_service::quote_for(client, config, &input.route_id, &input.vehicle_id, now),
    )?;

    booking_service::validate_trip(&input, &vehicle, settings.min_booking_notice_hours, now)?;

    let (pickup_location, dropoff_location) = booking_service::pickup_and_dropoff(&input, &route);
    let email = Some(input.email.trim().to_lowercase()).filter(|e| !e.is_empty());

    let mut booking = Booking {
        id: None,
        reference: booking_service::generate_reference(),
        customer: Customer {
            name: input.name.trim().to_string(),
            email,
            phone: input.phone.trim().to_string(),
            nationality: input.nationality,
        },
        route_id: route.id.ok_or_else(|| AppError::Internal("Route without id".to_string()))?,
        vehicle_id: vehicle
            .id
            .ok_or_else(|| AppError::Internal("Vehicle without id".to_string()))?,
        route_name: route.name.clone(),
        vehicle_name: vehicle.name.clone(),
        pickup_at: input.pickup_at,
        pickup_location,
        dropoff_location,
        passengers: input.passengers,
        luggage: input.luggage,
        flight_number: input.flight_number,
        notes: input.notes,
        admin_notes: None,
        source,
        status: BookingStatus::Pending,
        price: quote,
        status_history: vec![StatusChange {
            status: BookingStatus::Pending,
            at: now,
            by: None,
            note: None,
        }],
        created_at: Some(now),
        updated_at: Some(now),
    };

    let collection = mongo::collection::<Booking>(client, config, BOOKINGS);
    for attempt in 1..=REFERENCE_ATTEMPTS {
        match collection.insert_one(&booking).await.map_err(AppError::from) {
            Ok(result) => {
                booking.id = result.inserted_id.as_object_id();
                info!(
                    "Booking {} placed via {:?}: {} on {} for {} {}",
                    booking.reference,
                    source,
                    booking.vehicle_name,
                    booking.route_name,
                    booking.price.final_price,
                    booking.price.currency
                );
                return Ok(booking);
            }
            Err(err) if err.is_duplicate_key() && attempt < REFERENCE_ATTEMPTS => {
                warn!("Booking reference {} collided, regenerating", booking.reference);
                booking.reference = booking_service::generate_reference();
            }
            Err(err) => return Err(err),
        }
    }

    Err(AppError::Internal(
        "Could not allocate a booking reference".to_string(),
    ))
}
