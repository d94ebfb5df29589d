use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use mongodb::bson::{doc, Document};
use rand::{distributions::Alphanumeric, Rng};

use crate::{
    error::{AppError, AppResult},
    models::{
        bookings::{
            Booking, BookingFilter, BookingInput, BookingSource, BookingStatus,
        },
        route::Route,
        vehicle::Vehicle,
    },
    services::validation::{is_valid_email, is_valid_phone, require_text},
};

pub const REFERENCE_PREFIX: &str = "UT-";
const REFERENCE_LENGTH: usize = 8;

pub fn generate_reference() -> String {
    let code: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(REFERENCE_LENGTH)
        .map(char::from)
        .collect::<String>()
        .to_uppercase();
    format!("{}{}", REFERENCE_PREFIX, code)
}

/// The checks that need no stored data. Run before anything is loaded.
pub fn validate_contact(input: &BookingInput, source: BookingSource) -> AppResult<()> {
    require_text("Name", &input.name)?;
    require_text("Phone", &input.phone)?;
    if !is_valid_phone(&input.phone) {
        return Err(AppError::Validation("Invalid phone number".to_string()));
    }

    let email = input.email.trim();
    match source {
        BookingSource::Wizard if email.is_empty() => {
            return Err(AppError::Validation("Email is required".to_string()));
        }
        _ if !email.is_empty() && !is_valid_email(email) => {
            return Err(AppError::Validation("Invalid email address".to_string()));
        }
        _ => {}
    }
    Ok(())
}

/// Capacity, luggage and notice period against the chosen vehicle and site settings.
pub fn validate_trip(
    input: &BookingInput,
    vehicle: &Vehicle,
    min_notice_hours: u32,
    now: DateTime<Utc>,
) -> AppResult<()> {
    if input.passengers == 0 {
        return Err(AppError::Validation(
            "At least one passenger is required".to_string(),
        ));
    }
    if input.passengers > vehicle.passenger_capacity {
        return Err(AppError::Validation(format!(
            "{} seats at most {} passengers",
            vehicle.name, vehicle.passenger_capacity
        )));
    }
    if input.luggage > vehicle.luggage_capacity {
        return Err(AppError::Validation(format!(
            "{} carries at most {} pieces of luggage",
            vehicle.name, vehicle.luggage_capacity
        )));
    }

    let earliest = now + Duration::hours(min_notice_hours as i64);
    if input.pickup_at < earliest {
        return Err(AppError::Validation(format!(
            "Pickup must be at least {} hours from now",
            min_notice_hours
        )));
    }

    Ok(())
}

/// Fills defaults that depend on the route: pickup at its origin, drop-off at its destination.
pub fn pickup_and_dropoff(input: &BookingInput, route: &Route) -> (String, String) {
    let or_default = |value: &Option<String>, default: &str| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(default)
            .to_string()
    };
    (
        or_default(&input.pickup_location, &route.origin),
        or_default(&input.dropoff_location, &route.destination),
    )
}

pub fn ensure_transition(current: BookingStatus, next: BookingStatus) -> AppResult<()> {
    if current.can_transition_to(next) {
        Ok(())
    } else {
        Err(AppError::Conflict(format!(
            "Cannot change booking status from {} to {}",
            current.as_str(),
            next.as_str()
        )))
    }
}

fn phone_digits(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

/// A booking is disclosed only to someone who knows its e-mail address or phone number.
pub fn matches_contact(booking: &Booking, email: Option<&str>, phone: Option<&str>) -> bool {
    let email_matches = email
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .zip(booking.customer.email.as_deref())
        .is_some_and(|(given, stored)| stored.eq_ignore_ascii_case(given));

    let phone_matches = phone
        .map(phone_digits)
        .filter(|digits| digits.len() >= 7)
        .is_some_and(|digits| digits == phone_digits(&booking.customer.phone));

    email_matches || phone_matches
}

/// Back-office filter: status, pickup date range in business-local days (inclusive) and
/// a case-insensitive search over reference, name, phone and e-mail.
/// Second-precision UTC prefix of a stored `pickup_at`. Stored values carry a zone suffix,
/// so the prefix compares correctly against them as a plain string.
fn utc_bound(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S").to_string()
}

fn start_of_business_day(day: NaiveDate, offset: FixedOffset) -> Option<DateTime<Utc>> {
    day.and_hms_opt(0, 0, 0)
        .and_then(|midnight| offset.from_local_datetime(&midnight).single())
        .map(|start| start.with_timezone(&Utc))
}

/// Back-office booking filter. The date window covers whole business-local days, both ends inclusive.
pub fn admin_query(filter: &BookingFilter, offset: FixedOffset) -> Document {
    let mut query = doc! {};
    if let Some(status) = filter.status {
        query.insert("status", status.as_str());
    }

    let mut window = doc! {};
    if let Some(start) = filter.from.and_then(|from| start_of_business_day(from, offset)) {
        window.insert("$gte", utc_bound(start));
    }
    if let Some(end) = filter
        .to
        .and_then(|to| to.succ_opt())
        .and_then(|next| start_of_business_day(next, offset))
    {
        window.insert("$lt", utc_bound(end));
    }
    if !window.is_empty() {
        query.insert("pickup_at", window);
    }

    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = regex::escape(search);
        query.insert(
            "$or",
            ["reference", "customer.name", "customer.phone", "customer.email"]
                .iter()
                .map(|field| doc! { *field: { "$regex": &pattern, "$options": "i" } })
                .collect::<Vec<Document>>(),
        );
    }
    query
}

/// Open bookings picking up within the next seven days.
pub fn upcoming_query(now: DateTime<Utc>) -> Document {
    doc! {
        "status": { "$in": [BookingStatus::Pending.as_str(), BookingStatus::Confirmed.as_str()] },
        "pickup_at": {
            "$gte": utc_bound(now),
            "$lt": utc_bound(now + Duration::days(7) + Duration::seconds(1)),
        },
    }
}

/// Sum of fares over confirmed and completed bookings.
pub fn revenue_pipeline() -> Vec<Document> {
    vec![
        doc! { "$match": { "status": { "$in": [BookingStatus::Confirmed.as_str(), BookingStatus::Completed.as_str()] } } },
        doc! { "$group": { "_id": null, "revenue": { "$sum": "$price.final_price" } } },
    ]
}
