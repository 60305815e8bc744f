use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of content an extraction targets.
///
/// Partitions both provider capability and the interests of a monitored
/// profile. The set is closed: adding a variant is a schema change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Short-lived content that expires (stories).
    Ephemeral,
    /// Content that stays on the profile (posts).
    Permanent,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Ephemeral, Category::Permanent];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Ephemeral => "ephemeral",
            Category::Permanent => "permanent",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ephemeral" | "story" => Ok(Category::Ephemeral),
            "permanent" | "post" => Ok(Category::Permanent),
            other => Err(format!("unknown category '{other}'")),
        }
    }
}
