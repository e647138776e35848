//! View state: which page the shell is showing.
//!
//! Orthogonal to the cart contents, but held by the same controller so both
//! reset together at the explicit "continue shopping" action and nowhere
//! else. Rendering the pages is the shell's job.

use gallery_core::ArtworkId;

/// The page currently displayed, and which single artwork (if any) is under
/// detail view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewState {
    /// Landing page with the featured artworks.
    #[default]
    Home,
    /// Full listing, optionally narrowed to one category.
    Gallery { category: Option<String> },
    /// Detail view of a single artwork.
    ArtworkDetail { artwork_id: ArtworkId },
    /// The cart page.
    Cart,
    /// Terminal page shown after returning from the payment processor.
    CheckoutSuccess,
}
