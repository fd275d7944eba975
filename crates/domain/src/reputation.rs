use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest reputation score classified as [`Classification::Trusted`].
pub const TRUSTED_MIN_SCORE: i64 = 61;

/// Trust verdict derived from a reputation score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    Trusted,
    Untrusted,
}

impl Classification {
    /// `score >= 61` is trusted, `score <= 60` is untrusted.
    pub fn from_score(score: i64) -> Self {
        if score >= TRUSTED_MIN_SCORE {
            Classification::Trusted
        } else {
            Classification::Untrusted
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Trusted => "Trusted",
            Classification::Untrusted => "Untrusted",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
