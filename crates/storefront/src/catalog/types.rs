//! Artwork records as served by the catalog service.

use gallery_core::{ArtworkId, Availability, CurrencyCode, Price};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Currency the catalog prices in. The backend charges everything in USD
/// and its records carry a bare number, so the code lives on this side.
pub const CATALOG_CURRENCY: CurrencyCode = CurrencyCode::USD;

/// A purchasable artwork record from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artwork {
    pub id: ArtworkId,
    pub title: String,
    /// Unit price in [`CATALOG_CURRENCY`]'s standard unit.
    pub price: Decimal,
    pub medium: String,
    pub size: String,
    pub year_created: i32,
    pub description: String,
    pub image_url: String,
    pub category: String,
    pub availability: Availability,
}

impl Artwork {
    /// The unit price with its currency attached.
    #[must_use]
    pub const fn unit_price(&self) -> Price {
        Price::new(self.price, CATALOG_CURRENCY)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_backend_shape() {
        // Field-for-field the JSON the catalog service returns.
        let json = r#"{
            "id": "3f1c9c3e-0b5f-4a52-9b4a-1d2f6f6d7e8a",
            "title": "Azure Dreams",
            "price": 850.0,
            "medium": "Acrylic on Canvas",
            "size": "24\" x 36\"",
            "year_created": 2024,
            "description": "Flowing blue and white elements.",
            "image_url": "https://images.example.com/azure-dreams",
            "category": "abstract",
            "availability": "available"
        }"#;

        let artwork: Artwork = serde_json::from_str(json).unwrap();
        assert_eq!(artwork.title, "Azure Dreams");
        assert_eq!(artwork.price, Decimal::new(850, 0));
        assert_eq!(artwork.availability, Availability::Available);
        assert_eq!(artwork.unit_price().display(), "$850.00");
    }
}
