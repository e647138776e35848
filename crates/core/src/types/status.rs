//! Status enums for catalog entities.

use serde::{Deserialize, Serialize};

/// Sale availability of an artwork.
///
/// Original works are one-offs, so the catalog marks each piece either
/// available or sold rather than tracking stock counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    #[default]
    Available,
    Sold,
}

impl Availability {
    /// Query-string value understood by the catalog service.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Sold => "sold",
        }
    }
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
