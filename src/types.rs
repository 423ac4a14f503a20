use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Engagement counters shared by schematics and collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Counters {
    pub downloads: u64,
    pub likes: u64,
    pub dislikes: u64,
    pub views: u64,
}

impl Counters {
    pub fn new(downloads: u64, likes: u64, dislikes: u64, views: u64) -> Self {
        Self {
            downloads,
            likes,
            dislikes,
            views,
        }
    }
}

/// A user-uploaded schematic as listed on browse and profile pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schematic {
    pub id: String,
    pub tags: Vec<String>,
    pub upload_date: DateTime<Utc>,
    pub title: String,
    pub images: Vec<String>,
    #[serde(flatten)]
    pub counters: Counters,
    pub author: String,
}

impl Schematic {
    /// First image reference, used as the card thumbnail
    pub fn thumbnail(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// Full schematic page payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchematicDetails {
    #[serde(flatten)]
    pub schematic: Schematic,
    pub description: String,
    pub comments: Vec<Comment>,
    pub mods: Vec<String>,
    pub file: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub author: String,
    pub text: String,
}

/// External profile link (e.g. a video channel or repository)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLink {
    pub url: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub date_joined: DateTime<Utc>,
    pub avatar: String,
    pub links: Vec<UserLink>,
    pub total_downloads: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Named, ordered grouping of schematics authored by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub title: String,
    #[serde(flatten)]
    pub counters: Counters,
    pub author: String,
    pub schematics: Vec<String>,
}

/// Format a counter for display: 999 → "999", 1500 → "1.5K", 2000000 → "2M"
pub fn abbreviate_number(num: u64) -> String {
    const SUFFIXES: [(f64, &str); 2] = [(1e3, "K"), (1e6, "M")];

    if num < 1000 {
        return num.to_string();
    }

    let value = num as f64;
    let (scale, suffix) = SUFFIXES
        .iter()
        .rev()
        .find(|(scale, _)| value >= *scale)
        .copied()
        .unwrap_or(SUFFIXES[0]);

    let formatted = format!("{:.2}", value / scale);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed}{suffix}")
}
