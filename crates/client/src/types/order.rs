use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use trinket_store_core::{OrderId, OrderItemId, OrderStatus, ProductId, UserId};

use super::parse_timestamp;

/// An order. Amounts are integer cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "idOrder")]
    pub id: OrderId,
    pub user_id: UserId,
    #[serde(rename = "statusOrder")]
    pub status: OrderStatus,
    #[serde(rename = "totalOrders")]
    pub total_in_cents: i64,
    #[serde(rename = "currencyOrder", default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub checkout_id: Option<String>,
    #[serde(default)]
    pub payment_intent: Option<String>,
    #[serde(default)]
    pub pickup_qr_token: Option<String>,
    #[serde(default)]
    pub pix_qr_code_base64: Option<String>,
    #[serde(default)]
    pub pix_expires_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<OrderItem>>,
    #[serde(default)]
    pub user_name: Option<String>,
}

impl Order {
    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at.as_deref().and_then(parse_timestamp)
    }
}

/// Body for creating an order directly (admin).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
    pub user_id: UserId,
    #[serde(rename = "statusOrder", skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(rename = "totalOrders")]
    pub total_in_cents: i64,
    #[serde(rename = "currencyOrder")]
    pub currency: String,
    pub checkout_id: String,
    pub payment_intent: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_qr_token: Option<String>,
    pub items: Vec<OrderItemPayload>,
}

/// A line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(rename = "idItems")]
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    #[serde(rename = "qtyItems")]
    pub quantity: i64,
    pub unit_amount: i64,
    pub subtotal_amount: i64,
    #[serde(default)]
    pub product_name: Option<String>,
}

/// Body for an order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemPayload {
    pub product_id: ProductId,
    #[serde(rename = "qtyItems")]
    pub quantity: i64,
    pub unit_amount: i64,
    pub subtotal_amount: i64,
}

/// Partial body for updating an order line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    #[serde(rename = "qtyItems", skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_amount: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtotal_amount: Option<i64>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_wire_format() {
        let json = r#"{
            "idOrder": 12, "userId": 3, "statusOrder": "picked_up", "totalOrders": 5180,
            "currencyOrder": "BRL", "checkoutId": "PIX-1", "paymentIntent": "998877",
            "createdAt": "2025-03-01T10:00:00-03:00",
            "items": [{"idItems": 1, "orderId": 12, "productId": 2, "qtyItems": 2,
                       "unitAmount": 2590, "subtotalAmount": 5180}]
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.status, OrderStatus::PickedUp);
        assert_eq!(order.items.as_ref().unwrap()[0].quantity, 2);
        assert!(order.created_at().is_some());
        assert_eq!(order.pix_qr_code_base64, None);
    }
}
