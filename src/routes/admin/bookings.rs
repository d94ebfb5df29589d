use actix_web::{web, HttpResponse};
use chrono::Utc;
use futures::TryStreamExt;
use log::info;
use mongodb::{
    bson::{doc, Bson, Document},
    Client,
};
use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::mongo::{self, parse_object_id, BOOKINGS},
    error::{AppError, AppResult},
    middleware::auth_context::AuthenticatedUser,
    models::{
        audit::AuditAction,
        bookings::{
            Booking, BookingFilter, BookingStats, BookingStatus, BookingUpdateInput, StatusChange,
            StatusUpdateInput,
        },
        paging, Page,
    },
    services::{audit_service, booking_service, pricing_service::round_currency},
};

async fn load_booking(client: &Client, config: &AppConfig, id: &str) -> AppResult<Booking> {
    let oid = parse_object_id(id)?;
    mongo::collection::<Booking>(client, config, BOOKINGS)
        .find_one(doc! { "_id": oid })
        .await?
        .ok_or_else(|| AppError::not_found("Booking"))
}

async fn store_booking(client: &Client, config: &AppConfig, booking: &Booking) -> AppResult<()> {
    let id = booking
        .id
        .ok_or_else(|| AppError::Internal("Booking without id".to_string()))?;
    mongo::collection::<Booking>(client, config, BOOKINGS)
        .replace_one(doc! { "_id": id }, booking)
        .await?;
    Ok(())
}

/*
    GET /api/admin/bookings?status=..&from=..&to=..&search=..&page=..&limit=..
*/
pub async fn list_bookings(
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    params: web::Query<BookingFilter>,
) -> AppResult<HttpResponse> {
    let filter = params.into_inner();
    let (page, limit, skip) = paging(filter.page, filter.limit);
    let query = booking_service::admin_query(&filter, config.business_offset());

    let collection = mongo::collection::<Booking>(&data, &config, BOOKINGS);
    let total = collection.count_documents(query.clone()).await?;
    // Newest first; ObjectIds are time-ordered.
    let items: Vec<Booking> = collection
        .find(query)
        .sort(doc! { "_id": -1 })
        .skip(skip)
        .limit(limit as i64)
        .await?
        .try_collect()
        .await?;

    Ok(HttpResponse::Ok().json(Page {
        items,
        page,
        limit,
        total,
    }))
}

/*
    GET /api/admin/bookings/stats
*/
pub async fn booking_stats(
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
) -> AppResult<HttpResponse> {
    let collection = mongo::collection::<Booking>(&data, &config, BOOKINGS);
    let count = |filter: Document| {
        let collection = collection.clone();
        async move { collection.count_documents(filter).await }
    };
    let status = |status: BookingStatus| doc! { "status": status.as_str() };

    let revenue = async {
        let totals: Vec<Document> = collection
            .aggregate(booking_service::revenue_pipeline())
            .await?
            .try_collect()
            .await?;
        Ok::<f64, mongodb::error::Error>(
            totals
                .first()
                .and_then(|totals| totals.get("revenue"))
                .and_then(Bson::as_f64)
                .unwrap_or(0.0),
        )
    };

    let (total, pending, confirmed, completed, cancelled, upcoming_week, revenue) = tokio::try_join!(
        count(doc! {}),
        count(status(BookingStatus::Pending)),
        count(status(BookingStatus::Confirmed)),
        count(status(BookingStatus::Completed)),
        count(status(BookingStatus::Cancelled)),
        count(booking_service::upcoming_query(Utc::now())),
        revenue,
    )?;

    Ok(HttpResponse::Ok().json(BookingStats {
        total,
        pending,
        confirmed,
        completed,
        cancelled,
        revenue: round_currency(revenue),
        upcoming_week,
    }))
}

/*
    GET /api/admin/bookings/{id}
*/
pub async fn get_booking(
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let booking = load_booking(&data, &config, &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(booking))
}

/*
    PUT /api/admin/bookings/{id}/status
*/
pub async fn update_status(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    path: web::Path<String>,
    input: web::Json<StatusUpdateInput>,
) -> AppResult<HttpResponse> {
    let input = input.into_inner();
    let mut booking = load_booking(&data, &config, &path.into_inner()).await?;
    let previous = booking.status;
    booking_service::ensure_transition(previous, input.status)?;

    let now = Utc::now();
    booking.status = input.status;
    booking.status_history.push(StatusChange {
        status: input.status,
        at: now,
        by: Some(user.email().to_string()),
        note: input.note.filter(|n| !n.trim().is_empty()),
    });
    booking.updated_at = Some(now);
    store_booking(&data, &config, &booking).await?;

    info!(
        "Booking {} moved from {} to {} by {}",
        booking.reference,
        previous.as_str(),
        booking.status.as_str(),
        user.email()
    );
    audit_service::record(
        &data,
        &config,
        user.claims(),
        AuditAction::StatusChange,
        "booking",
        booking.id.map(|id| id.to_hex()),
        format!(
            "{}: {} -> {}",
            booking.reference,
            previous.as_str(),
            booking.status.as_str()
        ),
    )
    .await;

    Ok(HttpResponse::Ok().json(booking))
}

/*
    PUT /api/admin/bookings/{id}
    Pickup details and internal notes. Closed bookings are read-only.
*/
pub async fn update_booking(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    path: web::Path<String>,
    input: web::Json<BookingUpdateInput>,
) -> AppResult<HttpResponse> {
    let input = input.into_inner();
    let mut booking = load_booking(&data, &config, &path.into_inner()).await?;
    if booking.status.is_terminal() {
        return Err(AppError::Conflict(format!(
            "Booking {} is {} and can no longer be edited",
            booking.reference,
            booking.status.as_str()
        )));
    }

    if let Some(pickup_at) = input.pickup_at {
        booking.pickup_at = pickup_at;
    }
    if let Some(location) = input.pickup_location.filter(|l| !l.trim().is_empty()) {
        booking.pickup_location = location.trim().to_string();
    }
    if let Some(location) = input.dropoff_location.filter(|l| !l.trim().is_empty()) {
        booking.dropoff_location = location.trim().to_string();
    }
    if input.flight_number.is_some() {
        booking.flight_number = input.flight_number;
    }
    if input.admin_notes.is_some() {
        booking.admin_notes = input.admin_notes;
    }
    booking.updated_at = Some(Utc::now());
    store_booking(&data, &config, &booking).await?;

    audit_service::record(
        &data,
        &config,
        user.claims(),
        AuditAction::Update,
        "booking",
        booking.id.map(|id| id.to_hex()),
        format!("Updated booking {}", booking.reference),
    )
    .await;

    Ok(HttpResponse::Ok().json(booking))
}

/*
    DELETE /api/admin/bookings/{id}
*/
pub async fn delete_booking(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let booking = load_booking(&data, &config, &path.into_inner()).await?;
    let id = booking
        .id
        .ok_or_else(|| AppError::Internal("Booking without id".to_string()))?;

    mongo::collection::<Booking>(&data, &config, BOOKINGS)
        .delete_one(doc! { "_id": id })
        .await?;

    audit_service::record(
        &data,
        &config,
        user.claims(),
        AuditAction::Delete,
        "booking",
        Some(id.to_hex()),
        format!("Deleted booking {}", booking.reference),
    )
    .await;

    Ok(HttpResponse::NoContent().finish())
}
