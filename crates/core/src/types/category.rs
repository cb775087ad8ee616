//! Artwork categories.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a string is not a known [`Category`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown category: {0}")]
pub struct CategoryError(pub String);

/// The closed set of catalog categories.
///
/// Serialized using the variant name (e.g. `"WallArt"`), which is also the
/// value stored in the `category` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    WallArt,
    TexturedArt,
    LippanArt,
    HandmadeDecor,
    ArtPrint,
    CanvasArt,
    MixedMedia,
    AbstractArt,
    DecorArt,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Self; 9] = [
        Self::WallArt,
        Self::TexturedArt,
        Self::LippanArt,
        Self::HandmadeDecor,
        Self::ArtPrint,
        Self::CanvasArt,
        Self::MixedMedia,
        Self::AbstractArt,
        Self::DecorArt,
    ];

    /// Returns the stored name of the category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WallArt => "WallArt",
            Self::TexturedArt => "TexturedArt",
            Self::LippanArt => "LippanArt",
            Self::HandmadeDecor => "HandmadeDecor",
            Self::ArtPrint => "ArtPrint",
            Self::CanvasArt => "CanvasArt",
            Self::MixedMedia => "MixedMedia",
            Self::AbstractArt => "AbstractArt",
            Self::DecorArt => "DecorArt",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| CategoryError(s.to_owned()))
    }
}
