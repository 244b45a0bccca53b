//! Model module - Application state and data types
//!
//! - `types`: Track, ids, repeat mode and remote payloads
//! - `duration`: "M:SS" parsing and formatting
//! - `playback`: Playback session state machine
//! - `catalog`: Search/filter/sort view pipeline
//! - `favorites`: Favorite set with optimistic reconciliation
//! - `gateway`: Remote service contract and HTTP client
//! - `app_model`: Catalog view state, messages and secondary data

mod types;
mod duration;
mod playback;
mod catalog;
mod favorites;
mod gateway;
mod app_model;

pub use types::{ListeningStats, Profile, RepeatState, Track, TrackId};

pub use duration::{format_time, parse_duration};

pub use playback::{
    PlaybackInfo, PlaybackSession, PlaybackSettings, PlaybackState, TickOutcome,
    DEFAULT_VOLUME_PERCENT, MAX_VOLUME_PERCENT,
};

pub use catalog::{view, CatalogFacets, GenreFilter, SortKey, KNOWN_GENRES};

pub use favorites::{FavoritesStore, ToggleOutcome, ToggleStatus};

pub use gateway::{CatalogGateway, HttpCatalogGateway};

pub use app_model::{AppModel, CatalogRow, UiState, ViewGeneration};

#[cfg(test)]
pub(crate) use favorites::tests::{signed_in, FakeGateway};
