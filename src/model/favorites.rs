//! Locally known favorite tracks, reconciled against the remote store
//!
//! Adds are confirmed by the server before they show up locally; removals are
//! local only and get corrected by the next `load()`. At most one toggle per
//! track may be in flight.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::auth::AuthContext;
use crate::error::{ClientError, Result};
use super::gateway::CatalogGateway;
use super::types::TrackId;

/// Per-track status of favorite toggles
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ToggleStatus {
    #[default]
    Idle,
    /// Remote add requested, not answered yet
    Pending,
    /// Last toggle completed; `favorite` is the resulting membership
    Settled { favorite: bool },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
    /// The store was reset while the request was in flight; result dropped
    Discarded,
}

#[derive(Debug, Default)]
struct FavoritesState {
    ids: HashSet<TrackId>,
    toggles: HashMap<TrackId, ToggleStatus>,
    /// Bumped on reset so late responses from a torn-down view are ignored
    generation: u64,
}

#[derive(Clone, Default)]
pub struct FavoritesStore {
    state: Arc<RwLock<FavoritesState>>,
}

impl FavoritesStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_favorite(&self, track_id: &TrackId) -> bool {
        self.state.read().await.ids.contains(track_id)
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.ids.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.ids.is_empty()
    }

    pub async fn ids(&self) -> HashSet<TrackId> {
        self.state.read().await.ids.clone()
    }

    pub async fn status(&self, track_id: &TrackId) -> ToggleStatus {
        self.state
            .read()
            .await
            .toggles
            .get(track_id)
            .copied()
            .unwrap_or_default()
    }

    /// Empty the set and orphan every request still in flight
    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        state.ids.clear();
        state.toggles.clear();
        state.generation += 1;
        tracing::debug!(generation = state.generation, "Favorites reset");
    }

    /// Replace the local set with the server's list.
    ///
    /// On failure the set is left as it was; callers treat this as a soft error.
    pub async fn load(&self, gateway: &dyn CatalogGateway, auth: &AuthContext) -> Result<usize> {
        let generation = self.state.read().await.generation;

        let ids = gateway.list_favorites(auth).await?;

        let mut state = self.state.write().await;
        if state.generation != generation {
            tracing::debug!("Discarding favorites load for a reset store");
            return Ok(state.ids.len());
        }
        state.ids = ids.into_iter().collect();
        tracing::info!(count = state.ids.len(), "Favorites loaded");
        Ok(state.ids.len())
    }

    /// Flip the favorite state of a track.
    ///
    /// Present ids are removed locally without a remote call. Absent ids are
    /// added only after the server confirms. A toggle on an id whose previous
    /// add has not settled fails with `ToggleInFlight`.
    pub async fn toggle(
        &self,
        gateway: &dyn CatalogGateway,
        auth: &AuthContext,
        track_id: &TrackId,
    ) -> Result<ToggleOutcome> {
        auth.require()?;

        let generation = {
            let mut state = self.state.write().await;
            if state.toggles.get(track_id) == Some(&ToggleStatus::Pending) {
                tracing::debug!(%track_id, "Rejecting toggle, previous one still pending");
                return Err(ClientError::ToggleInFlight(track_id.clone()));
            }

            if state.ids.remove(track_id) {
                state
                    .toggles
                    .insert(track_id.clone(), ToggleStatus::Settled { favorite: false });
                tracing::info!(%track_id, "Removed track from favorites locally");
                return Ok(ToggleOutcome::Removed);
            }

            state.toggles.insert(track_id.clone(), ToggleStatus::Pending);
            state.generation
        };

        let result = gateway.add_favorite(auth, track_id).await;

        let mut state = self.state.write().await;
        if state.generation != generation {
            tracing::debug!(%track_id, "Discarding favorite add for a reset store");
            return Ok(ToggleOutcome::Discarded);
        }

        match result {
            Ok(()) => {
                state.ids.insert(track_id.clone());
                state
                    .toggles
                    .insert(track_id.clone(), ToggleStatus::Settled { favorite: true });
                Ok(ToggleOutcome::Added)
            }
            Err(e) => {
                state.toggles.remove(track_id);
                tracing::warn!(%track_id, error = %e, "Favorite add rejected");
                Err(e)
            }
        }
    }
}
