//! Cart contents: lines keyed by artwork identifier.
//!
//! The cart is an ordered sequence of lines (insertion order, for stable
//! display) with at most one line per artwork. Totals are derived on demand
//! at full decimal precision; nothing here is cached.

mod controller;

pub use controller::{
    CartController, CartEvent, CartObserver, CheckoutFlowError, CheckoutState, Navigator,
    RETURN_MARKER,
};

use gallery_core::{ArtworkId, Price};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::{Artwork, CATALOG_CURRENCY};

/// Immutable snapshot of a catalog item at the moment it entered the cart.
///
/// The cart owns its copy; later catalog edits (price changes, sold-out
/// flips) do not reach into an open cart. The unit price is a bare decimal
/// in [`CATALOG_CURRENCY`], like the catalog records it came from, so a
/// mixed-currency cart is unrepresentable; totals get the currency stamped
/// on the way out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtworkRef {
    pub id: ArtworkId,
    pub title: String,
    /// Unit price in [`CATALOG_CURRENCY`]'s standard unit.
    pub unit_price: Decimal,
    pub image_url: String,
}

impl From<&Artwork> for ArtworkRef {
    fn from(artwork: &Artwork) -> Self {
        Self {
            id: artwork.id.clone(),
            title: artwork.title.clone(),
            unit_price: artwork.price,
            image_url: artwork.image_url.clone(),
        }
    }
}

/// One artwork/quantity pair within the cart.
///
/// Invariant: `quantity >= 1`. A line that would reach quantity 0 is removed
/// from the cart instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub artwork: ArtworkRef,
    pub quantity: u32,
}

impl CartLine {
    /// Price of this line: unit price times quantity, full precision.
    #[must_use]
    pub fn line_total(&self) -> Price {
        Price::new(self.artwork.unit_price, CATALOG_CURRENCY).times(self.quantity)
    }
}

/// The cart: ordered lines, unique per artwork identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// The lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total number of items across all lines (cart badge count).
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Find the line for an artwork, if present.
    #[must_use]
    pub fn find(&self, artwork_id: &ArtworkId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.artwork.id == *artwork_id)
    }

    /// Add one of `artwork` to the cart.
    ///
    /// Merges into the existing line for the same identifier, otherwise
    /// appends a new line with quantity 1. Returns the line's new quantity.
    pub fn add(&mut self, artwork: ArtworkRef) -> u32 {
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.artwork.id == artwork.id)
        {
            line.quantity = line.quantity.saturating_add(1);
            return line.quantity;
        }

        self.lines.push(CartLine {
            artwork,
            quantity: 1,
        });
        1
    }

    /// Remove the line for `artwork_id`.
    ///
    /// Returns whether a line was removed; an absent identifier is a no-op,
    /// not an error.
    pub fn remove(&mut self, artwork_id: &ArtworkId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.artwork.id != *artwork_id);
        self.lines.len() != before
    }

    /// Replace the quantity of the line for `artwork_id` in place,
    /// preserving its position. A quantity of 0 removes the line.
    ///
    /// Returns the line's final quantity (`Some(0)` meaning removed), or
    /// `None` if no such line exists (no-op).
    pub fn set_quantity(&mut self, artwork_id: &ArtworkId, quantity: u32) -> Option<u32> {
        if quantity == 0 {
            return self.remove(artwork_id).then_some(0);
        }

        let line = self
            .lines
            .iter_mut()
            .find(|line| line.artwork.id == *artwork_id)?;
        line.quantity = quantity;
        Some(quantity)
    }

    /// The cart total: `Σ(unit price × quantity)`, recomputed on demand at
    /// full precision in [`CATALOG_CURRENCY`]. Display rounding is the
    /// presentation layer's call.
    #[must_use]
    pub fn total(&self) -> Price {
        let amount: Decimal = self
            .lines
            .iter()
            .map(|line| line.artwork.unit_price * Decimal::from(line.quantity))
            .sum();
        Price::new(amount, CATALOG_CURRENCY)
    }

    /// Drop all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
