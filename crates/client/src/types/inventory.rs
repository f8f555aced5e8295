use serde::{Deserialize, Serialize};
use trinket_store_core::{InventoryId, ProductId};

/// Stock record for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    #[serde(rename = "idInventory")]
    pub id: InventoryId,
    pub product_id: ProductId,
    #[serde(default)]
    pub qty_on_hand: i64,
    #[serde(rename = "nomeProduct", default)]
    pub product_name: Option<String>,
    #[serde(rename = "slugProduct", default)]
    pub product_slug: Option<String>,
    #[serde(rename = "categoriaProduct", default)]
    pub product_category: Option<String>,
    #[serde(rename = "imagemurlProduct", default)]
    pub product_image: Option<String>,
    #[serde(rename = "ativoProduct", default)]
    pub product_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInventoryPayload {
    pub product_id: ProductId,
    pub qty_on_hand: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInventoryPayload {
    pub qty_on_hand: i64,
}
