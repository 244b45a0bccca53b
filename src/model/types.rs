//! Core type definitions for the catalog and the remote contract

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::Result;
use super::duration::parse_duration;

/// Deserialize a value that may be missing or `null` into its default
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Like `null_as_default`, but a value of the wrong type also falls back to the
/// default instead of failing the whole record
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|value| T::deserialize(value).ok())
        .unwrap_or_default())
}

/// Identifier of a catalog track, as issued by the remote service
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrackId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// One catalog entry. Immutable once loaded.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    #[serde(rename = "_id", default, deserialize_with = "lenient")]
    pub id: TrackId,
    #[serde(default, deserialize_with = "lenient")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient")]
    pub artist: String,
    #[serde(default, deserialize_with = "lenient")]
    pub album: String,
    #[serde(default, deserialize_with = "lenient")]
    pub genre: String,
    #[serde(default, deserialize_with = "lenient")]
    pub release_year: i32,
    /// Wire duration, "M:SS"
    #[serde(default, deserialize_with = "lenient")]
    pub duration: String,
    #[serde(rename = "imageUrl", default, deserialize_with = "lenient")]
    pub cover_url: String,
}

impl Track {
    /// Length in seconds, derived from the wire duration
    pub fn duration_seconds(&self) -> Result<u32> {
        parse_duration(&self.duration)
    }
}

/// Repeat mode state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RepeatState {
    #[default]
    Off,
    All,
    One,
}

impl RepeatState {
    pub fn next(self) -> Self {
        match self {
            RepeatState::Off => RepeatState::All,
            RepeatState::All => RepeatState::One,
            RepeatState::One => RepeatState::Off,
        }
    }
}

impl fmt::Display for RepeatState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RepeatState::Off => "off",
            RepeatState::All => "all",
            RepeatState::One => "one",
        };
        f.write_str(label)
    }
}

/// Aggregated listening statistics for the signed-in user
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListeningStats {
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_plays: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub favorites_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    total_playlists: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub songs_listened: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub top_genres: Vec<serde_json::Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub monthly_stats: Vec<serde_json::Value>,
}

impl ListeningStats {
    /// Every user owns at least the default playlist, so zero reads as one
    pub fn total_playlists(&self) -> u64 {
        self.total_playlists.max(1)
    }
}

/// Account profile of the signed-in user
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Profile {
    #[serde(rename = "_id", default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub favorites: Vec<TrackId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub listened: Vec<TrackId>,
    #[serde(rename = "createdAt", default)]
    pub joined_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// Join date as "<Month> <Year>", empty when unknown
    pub fn join_date_label(&self) -> String {
        self.joined_at
            .map(|date| date.format("%B %Y").to_string())
            .unwrap_or_default()
    }
}
