//! Backend entity records and request payloads.
//!
//! Field names on the wire follow the backend DTOs (`idProduct`,
//! `nomeProduct`, `qtyOnHand`, ...); the Rust fields use plain English names.

mod auth;
mod checkout;
mod inventory;
mod order;
mod price;
mod product;
mod user;

pub use auth::{AuthResponse, LoginCredentials, SignUpRequest};
pub use checkout::{PixCheckoutRequest, PixCheckoutResponse, PixPaymentDetails};
pub use inventory::{CreateInventoryPayload, InventoryRecord, UpdateInventoryPayload};
pub use order::{CreateOrderPayload, Order, OrderItem, OrderItemPayload, OrderItemUpdate};
pub use price::{PricePayload, PriceUpdate, ProductPrice};
pub use product::{Product, ProductPayload};
pub use user::{UpdateUserPayload, User};

use chrono::{DateTime, NaiveDateTime, Utc};

/// Parse a backend timestamp.
///
/// Accepts RFC 3339 (`2025-03-01T10:00:00-03:00`) and offset-less ISO
/// timestamps (`2025-03-01T10:00:00.123`), the latter read as UTC.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.and_utc())
        })
        .ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_timestamp() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 1, 13, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2025-03-01T10:00:00-03:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-03-01T13:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2025-03-01T13:00:00"), Some(expected));
        assert!(parse_timestamp("2025-03-01T13:00:00.250").is_some());
        assert_eq!(parse_timestamp("yesterday"), None);
    }
}
