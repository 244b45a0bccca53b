//! Catalog view, favorites and account data

use crate::error::{ClientError, Result};
use crate::model::{ListeningStats, Profile, ToggleOutcome, TrackId};

use super::AppController;

/// What a catalog mount ended up with
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadSummary {
    /// False when the view was dismissed before the catalog arrived
    pub applied: bool,
    pub tracks: usize,
    /// None when favorites could not be loaded
    pub favorites: Option<usize>,
}

impl AppController {
    /// Mount the catalog view: fetch songs and favorites side by side.
    ///
    /// Catalog failures are primary and surface as the error banner; a failed
    /// favorites load only leaves the badges empty.
    pub async fn mount_catalog(&self) -> Result<LoadSummary> {
        let generation = self.model.mount().await;
        tracing::debug!("Loading catalog and favorites");

        let gateway = self.gateway.as_ref();
        let (songs, favorites) = futures::join!(
            gateway.list_songs(&self.auth),
            self.model.favorites().load(gateway, &self.auth)
        );

        let favorites = match favorites {
            Ok(count) => Some(count),
            Err(e) => {
                tracing::warn!(error = %e, "Could not load favorites");
                None
            }
        };

        match songs {
            Ok(tracks) => {
                let count = tracks.len();
                let applied = self.model.apply_catalog(generation, tracks).await;
                Ok(LoadSummary {
                    applied,
                    tracks: count,
                    favorites,
                })
            }
            Err(e) => {
                self.model.finish_loading(generation).await;
                if self.model.is_current(generation).await {
                    tracing::error!(error = %e, "Catalog load failed");
                    self.model.set_error(Self::format_error(&e)).await;
                }
                Err(e)
            }
        }
    }

    /// Dismiss the catalog view and the player opened from it
    pub async fn dismiss_catalog(&self) {
        self.model.unmount().await;
        self.player.close().await;
    }

    pub async fn toggle_favorite(&self, track_id: &TrackId) -> Result<ToggleOutcome> {
        if track_id.is_empty() {
            tracing::warn!("Cannot toggle favorite: track ID is empty");
            let err = ClientError::TrackNotFound(track_id.clone());
            self.model.set_error(Self::format_error(&err)).await;
            return Err(err);
        }

        tracing::debug!(%track_id, "Toggling favorite");
        match self
            .model
            .favorites()
            .toggle(self.gateway.as_ref(), &self.auth, track_id)
            .await
        {
            Ok(outcome) => {
                tracing::info!(%track_id, ?outcome, "Favorite toggled");
                Ok(outcome)
            }
            Err(e) => {
                self.model.set_error(Self::format_error(&e)).await;
                Err(e)
            }
        }
    }

    /// Bind a catalog track to the player, paused at the start
    pub async fn select_track(&self, track_id: &TrackId) -> Result<()> {
        let Some(track) = self.model.find_track(track_id).await else {
            let err = ClientError::TrackNotFound(track_id.clone());
            self.model.set_error(Self::format_error(&err)).await;
            return Err(err);
        };

        if let Err(e) = self.player.select(&track).await {
            tracing::warn!(%track_id, error = %e, "Track could not be opened");
            self.model.set_error(Self::format_error(&e)).await;
            return Err(e);
        }
        Ok(())
    }

    /// Listening stats are an enrichment: failures become a soft notice
    pub async fn load_stats(&self) -> Option<ListeningStats> {
        match self.gateway.get_stats(&self.auth).await {
            Ok(stats) => {
                self.model.set_stats(stats.clone()).await;
                Some(stats)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load stats");
                self.model.set_notice(Some(Self::format_error(&e))).await;
                None
            }
        }
    }

    pub async fn load_profile(&self) -> Result<Profile> {
        match self.gateway.get_profile(&self.auth).await {
            Ok(profile) => {
                self.model.set_profile(profile.clone()).await;
                Ok(profile)
            }
            Err(e) => {
                self.model.set_error(Self::format_error(&e)).await;
                Err(e)
            }
        }
    }
}
