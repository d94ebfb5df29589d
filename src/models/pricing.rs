use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const PRICING_DOCUMENT_ID: &str = "default";

/// route id -> vehicle id -> price
pub type RateTable = BTreeMap<String, BTreeMap<String, f64>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    Percentage,
    Fixed,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Discount {
    pub enabled: bool,
    pub kind: DiscountKind,
    pub value: f64,
    /// First day the discount applies, in business-local time. Open-ended when absent.
    pub start_date: Option<NaiveDate>,
    /// Last day the discount applies, inclusive.
    pub end_date: Option<NaiveDate>,
    pub label: Option<String>,
}

impl Default for Discount {
    fn default() -> Self {
        Discount {
            enabled: false,
            kind: DiscountKind::Percentage,
            value: 0.0,
            start_date: None,
            end_date: None,
            label: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PricingMatrix {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub custom_rates: RateTable,
    #[serde(default)]
    pub discount: Discount,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<String>,
}

impl Default for PricingMatrix {
    fn default() -> Self {
        PricingMatrix {
            id: PRICING_DOCUMENT_ID.to_string(),
            custom_rates: RateTable::new(),
            discount: Discount::default(),
            updated_at: None,
            updated_by: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PriceQuote {
    pub route_id: String,
    pub vehicle_id: String,
    pub base_price: f64,
    pub discount_amount: f64,
    pub final_price: f64,
    pub currency: String,
    pub discount_applied: bool,
    pub discount_label: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QuoteQuery {
    pub route_id: String,
    pub vehicle_id: String,
}

#[derive(Debug, Deserialize)]
pub struct RateInput {
    pub price: f64,
}

#[derive(Debug, Serialize)]
pub struct PriceTableRow {
    pub route_id: String,
    pub route_name: String,
    pub origin: String,
    pub destination: String,
    pub quotes: Vec<PriceTableCell>,
}

#[derive(Debug, Serialize)]
pub struct PriceTableCell {
    pub vehicle_id: String,
    pub vehicle_name: String,
    pub passenger_capacity: u32,
    pub base_price: f64,
    pub final_price: f64,
}

#[derive(Debug, Serialize)]
pub struct PriceTable {
    pub currency: String,
    pub discount: Option<Discount>,
    pub rows: Vec<PriceTableRow>,
}
