//! Normalized forum entities.
//!
//! Rows mirror the SQLite schema in [`crate::storage::schema`]. Surrogate ids
//! are SQLite rowids; natural keys (`username`, `topic_name`) are
//! case-sensitive and unique.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum username length, in characters.
pub const USERNAME_MAX: usize = 25;
/// Maximum topic name length, in characters.
pub const TOPIC_NAME_MAX: usize = 30;
/// Maximum topic description length, in characters.
pub const TOPIC_DESCRIPTION_MAX: usize = 500;
/// Maximum post title length, in characters. Longer legacy titles are
/// truncated at this boundary (titles are free text, not identifiers).
pub const POST_TITLE_MAX: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub time_created: DateTime<Utc>,
    /// Refreshed whenever the username changes; never caller-supplied.
    pub username_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: i64,
    pub topic_name: String,
    pub topic_description: Option<String>,
    pub time_created: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub post_title: String,
    pub post_url: Option<String>,
    pub post_content: Option<String>,
    /// Nulled when the author is deleted.
    pub user_id: Option<i64>,
    pub topic_id: i64,
    pub time_created: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub comment_text: String,
    pub user_id: Option<i64>,
    pub post_id: i64,
    /// Self-reference; NULL for thread roots.
    pub comment_parent_id: Option<i64>,
    pub time_created: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub id: i64,
    pub vote: VoteDirection,
    pub user_id: Option<i64>,
    pub post_id: i64,
    pub time_created: DateTime<Utc>,
}

/// A post body is exactly one of a URL or text content. Constructing a post
/// through this enum makes the url/content exclusivity invariant
/// unrepresentable at the API seam.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostBody {
    Url(String),
    Text(String),
}

impl PostBody {
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Url(url) => Some(url),
            Self::Text(_) => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Url(_) => None,
            Self::Text(text) => Some(text),
        }
    }
}

/// Vote direction, stored as `+1` / `-1`. No other value is representable
/// here or accepted by the schema CHECK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    /// Stored encoding: `+1` for up, `-1` for down.
    #[must_use]
    pub fn value(self) -> i64 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }

    #[must_use]
    pub fn from_value(value: i64) -> Option<Self> {
        match value {
            1 => Some(Self::Up),
            -1 => Some(Self::Down),
            _ => None,
        }
    }
}
