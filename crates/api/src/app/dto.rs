use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use salesrelay_core::SaleTimestamp;
use salesrelay_sales::{JewelrySale, ProductLine, SaleEvent, ToySale};

use crate::app::errors::ApiError;

// -------------------------
// Request DTOs
// -------------------------

/// A webhook body that maps onto one product line's sale.
///
/// Every field is optional on the wire; absent and `null` values become empty
/// strings, and an absent or empty `time` becomes `now`.
pub trait SaleRequest: DeserializeOwned + Send + 'static {
    const LINE: ProductLine;

    fn into_event(self, now: DateTime<Utc>) -> SaleEvent;
}

#[derive(Debug, Default, Deserialize)]
pub struct ToySaleRequest {
    pub time: Option<String>,
    pub item: Option<String>,
    pub material: Option<String>,
    pub price: Option<String>,
    #[serde(rename = "paymentType")]
    pub payment_type: Option<String>,
}

impl SaleRequest for ToySaleRequest {
    const LINE: ProductLine = ProductLine::Toy;

    fn into_event(self, now: DateTime<Utc>) -> SaleEvent {
        SaleEvent::Toy(ToySale {
            timestamp: SaleTimestamp::from_caller(self.time, now),
            item: self.item.unwrap_or_default(),
            material: self.material.unwrap_or_default(),
            price: self.price.unwrap_or_default(),
            payment_type: self.payment_type.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct JewelrySaleRequest {
    pub time: Option<String>,
    pub item: Option<String>,
    pub price: Option<String>,
    #[serde(rename = "paymentType")]
    pub payment_type: Option<String>,
}

impl SaleRequest for JewelrySaleRequest {
    const LINE: ProductLine = ProductLine::Jewelry;

    fn into_event(self, now: DateTime<Utc>) -> SaleEvent {
        SaleEvent::Jewelry(JewelrySale {
            timestamp: SaleTimestamp::from_caller(self.time, now),
            item: self.item.unwrap_or_default(),
            price: self.price.unwrap_or_default(),
            payment_type: self.payment_type.unwrap_or_default(),
        })
    }
}

/// Decode a request body that must be a single JSON object.
///
/// Arrays are rejected even though serde would map them onto the struct
/// positionally.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    let value: serde_json::Value = serde_json::from_slice(body).map_err(ApiError::InvalidBody)?;
    if !value.is_object() {
        return Err(ApiError::NotAnObject);
    }
    serde_json::from_value(value).map_err(ApiError::InvalidBody)
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Clone, Serialize)]
pub struct SaleRecorded {
    pub status: &'static str,
    pub message: &'static str,
}

impl Default for SaleRecorded {
    fn default() -> Self {
        Self {
            status: "success",
            message: "Sale processed successfully",
        }
    }
}
