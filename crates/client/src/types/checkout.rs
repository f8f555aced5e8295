use serde::{Deserialize, Serialize};
use trinket_store_core::UserId;

use super::{Order, OrderItemPayload};

/// Body for `POST /checkout/pix`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PixCheckoutRequest {
    pub user_id: UserId,
    pub total_amount_in_cents: i64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub items: Vec<OrderItemPayload>,
}

/// PIX charge attached to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PixPaymentDetails {
    pub payment_id: String,
    #[serde(default)]
    pub status: Option<String>,
    /// Copy-and-paste PIX code.
    #[serde(default)]
    pub qr_code: Option<String>,
    #[serde(default)]
    pub qr_code_base64: Option<String>,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub checkout_id: Option<String>,
}

/// Response of the PIX checkout endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixCheckoutResponse {
    pub order: Order,
    pub pix: PixPaymentDetails,
}
