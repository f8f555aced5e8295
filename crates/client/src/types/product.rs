use serde::{Deserialize, Serialize};
use trinket_store_core::fields::{
    has_length_between, is_present, is_valid_slug, is_valid_url, to_slug, trim_and_collapse,
};
use trinket_store_core::{ProductId, ProductStatus};

use crate::error::ApiError;

/// A product as returned by `/products`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "idProduct")]
    pub id: ProductId,
    #[serde(rename = "nomeProduct")]
    pub name: String,
    #[serde(rename = "slugProduct")]
    pub slug: String,
    #[serde(rename = "descricaoProduct", default)]
    pub description: Option<String>,
    #[serde(rename = "imagemurlProduct", default)]
    pub image_url: Option<String>,
    #[serde(rename = "categoriaProduct", default)]
    pub category: Option<String>,
    #[serde(rename = "ativo")]
    pub active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Product {
    #[must_use]
    pub const fn status(&self) -> ProductStatus {
        ProductStatus::from_active(self.active)
    }
}

/// Body for creating or updating a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPayload {
    #[serde(rename = "nomeProduct")]
    pub name: String,
    #[serde(rename = "slugProduct")]
    pub slug: String,
    #[serde(rename = "descricaoProduct")]
    pub description: String,
    #[serde(rename = "imagemurlProduct")]
    pub image_url: String,
    #[serde(rename = "categoriaProduct")]
    pub category: String,
    #[serde(rename = "ativo")]
    pub active: bool,
    /// Stock to open the inventory record with (creation only).
    #[serde(rename = "initialStock", skip_serializing_if = "Option::is_none", default)]
    pub initial_stock: Option<u32>,
}

impl ProductPayload {
    /// Clean up form input and reject what the backend would refuse.
    ///
    /// Whitespace in the name and category is collapsed. An empty slug is
    /// derived from the name.
    ///
    /// # Errors
    ///
    /// Returns a 400 [`ApiError`] for a name outside 2-120 characters, a
    /// malformed slug, or an image URL that is not absolute.
    pub fn normalized(&self) -> Result<Self, ApiError> {
        let name = trim_and_collapse(&self.name);
        if !has_length_between(Some(name.as_str()), 2, 120) {
            return Err(ApiError::validation(
                "Product name must have between 2 and 120 characters.",
            ));
        }

        let slug = match self.slug.trim() {
            "" => to_slug(&name),
            given => given.to_string(),
        };
        if !is_valid_slug(Some(slug.as_str())) {
            return Err(ApiError::validation(
                "Slug may only use lowercase letters, digits and single dashes.",
            ));
        }

        let image_url = self.image_url.trim().to_string();
        if is_present(Some(image_url.as_str())) && !is_valid_url(Some(image_url.as_str())) {
            return Err(ApiError::validation("Image URL must be an absolute address."));
        }

        Ok(Self {
            name,
            slug,
            description: self.description.trim().to_string(),
            image_url,
            category: trim_and_collapse(&self.category),
            active: self.active,
            initial_stock: self.initial_stock,
        })
    }
}
