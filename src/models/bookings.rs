use chrono::{DateTime, NaiveDate, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::models::pricing::PriceQuote;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Completed) | (Confirmed, Cancelled)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingSource {
    Wizard,
    Quick,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Customer {
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    pub nationality: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatusChange {
    pub status: BookingStatus,
    pub at: DateTime<Utc>,
    pub by: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Booking {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub reference: String,
    pub customer: Customer,
    pub route_id: ObjectId,
    pub vehicle_id: ObjectId,
    pub route_name: String,
    pub vehicle_name: String,
    pub pickup_at: DateTime<Utc>,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub passengers: u32,
    pub luggage: u32,
    pub flight_number: Option<String>,
    pub notes: Option<String>,
    pub admin_notes: Option<String>,
    pub source: BookingSource,
    pub status: BookingStatus,
    pub price: PriceQuote,
    #[serde(default)]
    pub status_history: Vec<StatusChange>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Everything the multi-step wizard collects.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingInput {
    pub route_id: String,
    pub vehicle_id: String,
    pub pickup_at: DateTime<Utc>,
    pub pickup_location: Option<String>,
    pub dropoff_location: Option<String>,
    pub passengers: u32,
    #[serde(default)]
    pub luggage: u32,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub nationality: Option<String>,
    pub flight_number: Option<String>,
    pub notes: Option<String>,
}

/// The compact widget on the landing page.
#[derive(Debug, Clone, Deserialize)]
pub struct QuickBookingInput {
    pub route_id: String,
    pub vehicle_id: String,
    pub pickup_at: DateTime<Utc>,
    pub passengers: u32,
    pub name: String,
    pub phone: String,
}

impl From<QuickBookingInput> for BookingInput {
    fn from(quick: QuickBookingInput) -> Self {
        BookingInput {
            route_id: quick.route_id,
            vehicle_id: quick.vehicle_id,
            pickup_at: quick.pickup_at,
            pickup_location: None,
            dropoff_location: None,
            passengers: quick.passengers,
            luggage: 0,
            name: quick.name,
            email: String::new(),
            phone: quick.phone,
            nationality: None,
            flight_number: None,
            notes: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BookingConfirmation {
    pub reference: String,
    pub status: BookingStatus,
    pub pickup_at: DateTime<Utc>,
    pub route_name: String,
    pub vehicle_name: String,
    pub price: PriceQuote,
}

impl From<&Booking> for BookingConfirmation {
    fn from(booking: &Booking) -> Self {
        BookingConfirmation {
            reference: booking.reference.clone(),
            status: booking.status,
            pickup_at: booking.pickup_at,
            route_name: booking.route_name.clone(),
            vehicle_name: booking.vehicle_name.clone(),
            price: booking.price.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateInput {
    pub status: BookingStatus,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BookingUpdateInput {
    pub pickup_at: Option<DateTime<Utc>>,
    pub pickup_location: Option<String>,
    pub dropoff_location: Option<String>,
    pub flight_number: Option<String>,
    pub admin_notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BookingFilter {
    pub status: Option<BookingStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub search: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Default, Serialize, PartialEq)]
pub struct BookingStats {
    pub total: u64,
    pub pending: u64,
    pub confirmed: u64,
    pub completed: u64,
    pub cancelled: u64,
    pub revenue: f64,
    pub upcoming_week: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_machine_allows_forward_moves_only() {
        use BookingStatus::*;
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Completed));
        assert!(Confirmed.can_transition_to(Cancelled));

        assert!(!Pending.can_transition_to(Completed));
        assert!(!Pending.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Confirmed));
    }

    #[test]
    fn terminal_states() {
        assert!(BookingStatus::Completed.is_terminal());
        assert!(BookingStatus::Cancelled.is_terminal());
        assert!(!BookingStatus::Pending.is_terminal());
    }

    #[test]
    fn quick_booking_leaves_email_empty() {
        let quick = QuickBookingInput {
            route_id: "r".into(),
            vehicle_id: "v".into(),
            pickup_at: Utc::now(),
            passengers: 3,
            name: "Amina".into(),
            phone: "+966500000000".into(),
        };
        let input = BookingInput::from(quick);
        assert!(input.email.is_empty());
        assert_eq!(input.luggage, 0);
        assert!(input.pickup_location.is_none());
    }
}
