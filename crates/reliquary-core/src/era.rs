//! Historical eras used to categorize artifacts

use serde::{Deserialize, Serialize};

/// The period an artifact comes from. Doubles as the item category used
/// by category-mode matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Era {
    Prehistoric,
    Ancient,
    Medieval,
    Renaissance,
    Industrial,
    Modern,
    Future,
}

impl Era {
    /// Every era, oldest first
    pub const ALL: [Era; 7] = [
        Era::Prehistoric,
        Era::Ancient,
        Era::Medieval,
        Era::Renaissance,
        Era::Industrial,
        Era::Modern,
        Era::Future,
    ];

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Self::Prehistoric => "Prehistoric",
            Self::Ancient => "Ancient",
            Self::Medieval => "Medieval",
            Self::Renaissance => "Renaissance",
            Self::Industrial => "Industrial",
            Self::Modern => "Modern",
            Self::Future => "Future",
        }
    }
}

impl std::fmt::Display for Era {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
