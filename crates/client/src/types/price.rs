use serde::{Deserialize, Serialize};
use trinket_store_core::{CurrencyCode, Price, PriceId, ProductId};

/// A price row from `/prices`. Amounts are integer cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPrice {
    #[serde(rename = "idPrice")]
    pub id: PriceId,
    pub product_id: ProductId,
    #[serde(rename = "amountPrice")]
    pub amount_in_cents: i64,
    #[serde(rename = "currencyPrice")]
    pub currency: String,
    /// Whether this is the product's current price.
    #[serde(rename = "vigentePrice")]
    pub current: bool,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl ProductPrice {
    /// The amount as money. Unknown currencies fall back to BRL.
    #[must_use]
    pub fn price(&self) -> Price {
        let currency = self.currency.parse().unwrap_or(CurrencyCode::BRL);
        Price::from_cents(self.amount_in_cents, currency)
    }
}

/// Body for creating a price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePayload {
    pub product_id: ProductId,
    #[serde(rename = "amountPrice")]
    pub amount_in_cents: i64,
    #[serde(rename = "currencyPrice")]
    pub currency: String,
    #[serde(rename = "vigentePrice")]
    pub current: bool,
}

/// Partial body for updating a price.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    #[serde(rename = "amountPrice", skip_serializing_if = "Option::is_none")]
    pub amount_in_cents: Option<i64>,
    #[serde(rename = "currencyPrice", skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(rename = "vigentePrice", skip_serializing_if = "Option::is_none")]
    pub current: Option<bool>,
}
