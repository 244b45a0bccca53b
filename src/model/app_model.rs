//! Main application model with state management

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

use super::catalog::{self, CatalogFacets, GenreFilter, SortKey};
use super::favorites::FavoritesStore;
use super::types::{ListeningStats, Profile, Track, TrackId};

const ERROR_DISPLAY_TIME: Duration = Duration::from_secs(5);

/// Identifies one mount of the catalog view. Results tagged with an older
/// generation belong to a dismissed view and are dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewGeneration(u64);

/// One line of the catalog listing
#[derive(Clone, Debug)]
pub struct CatalogRow {
    pub track: Arc<Track>,
    pub favorite: bool,
}

#[derive(Default)]
struct CatalogState {
    tracks: Vec<Arc<Track>>,
    facets: CatalogFacets,
    loading: bool,
    generation: u64,
    mounted: bool,
}

/// User-visible messages and secondary data
#[derive(Clone, Debug, Default)]
pub struct UiState {
    pub error_message: Option<String>,
    pub error_timestamp: Option<Instant>,
    /// Soft inline notice for enrichments that failed (stats)
    pub notice: Option<String>,
    pub stats: Option<ListeningStats>,
    pub profile: Option<Profile>,
}

pub struct AppModel {
    catalog: Mutex<CatalogState>,
    favorites: FavoritesStore,
    ui_state: Mutex<UiState>,
}

impl AppModel {
    pub fn new() -> Self {
        Self {
            catalog: Mutex::new(CatalogState::default()),
            favorites: FavoritesStore::new(),
            ui_state: Mutex::new(UiState::default()),
        }
    }

    pub fn favorites(&self) -> &FavoritesStore {
        &self.favorites
    }

    // ========================================================================
    // Catalog view lifecycle
    // ========================================================================

    /// Start a fresh catalog view: empty catalog, empty favorites
    pub async fn mount(&self) -> ViewGeneration {
        self.favorites.reset().await;
        let mut catalog = self.catalog.lock().await;
        catalog.generation += 1;
        catalog.mounted = true;
        catalog.loading = true;
        catalog.tracks.clear();
        tracing::debug!(generation = catalog.generation, "Catalog view mounted");
        ViewGeneration(catalog.generation)
    }

    /// Dismiss the view; anything still in flight for it will be dropped
    pub async fn unmount(&self) {
        self.favorites.reset().await;
        let mut catalog = self.catalog.lock().await;
        catalog.generation += 1;
        catalog.mounted = false;
        catalog.loading = false;
        tracing::debug!("Catalog view dismissed");
    }

    pub async fn is_current(&self, generation: ViewGeneration) -> bool {
        let catalog = self.catalog.lock().await;
        catalog.mounted && catalog.generation == generation.0
    }

    /// Store a loaded catalog if it still belongs to the mounted view
    pub async fn apply_catalog(&self, generation: ViewGeneration, tracks: Vec<Track>) -> bool {
        let mut catalog = self.catalog.lock().await;
        if !catalog.mounted || catalog.generation != generation.0 {
            tracing::debug!(count = tracks.len(), "Discarding catalog for a dismissed view");
            return false;
        }
        catalog.tracks = tracks.into_iter().map(Arc::new).collect();
        catalog.loading = false;
        true
    }

    pub async fn finish_loading(&self, generation: ViewGeneration) {
        let mut catalog = self.catalog.lock().await;
        if catalog.generation == generation.0 {
            catalog.loading = false;
        }
    }

    pub async fn is_loading(&self) -> bool {
        self.catalog.lock().await.loading
    }

    pub async fn catalog_len(&self) -> usize {
        self.catalog.lock().await.tracks.len()
    }

    pub async fn find_track(&self, track_id: &TrackId) -> Option<Arc<Track>> {
        let catalog = self.catalog.lock().await;
        catalog.tracks.iter().find(|t| &t.id == track_id).cloned()
    }

    // ========================================================================
    // Facets
    // ========================================================================

    pub async fn facets(&self) -> CatalogFacets {
        self.catalog.lock().await.facets.clone()
    }

    pub async fn update_search_query(&self, query: String) {
        self.catalog.lock().await.facets.search_query = query;
    }

    pub async fn set_genre(&self, genre: GenreFilter) {
        self.catalog.lock().await.facets.genre = genre;
    }

    pub async fn set_sort_key(&self, sort_key: SortKey) {
        self.catalog.lock().await.facets.sort_key = sort_key;
    }

    /// The catalog under the current facets, with favorite badges
    pub async fn visible_rows(&self) -> Vec<CatalogRow> {
        let visible = {
            let state = self.catalog.lock().await;
            catalog::view(&state.tracks, &state.facets)
        };

        let favorites = self.favorites.ids().await;
        visible
            .into_iter()
            .map(|track| CatalogRow {
                favorite: favorites.contains(&track.id),
                track,
            })
            .collect()
    }

    // ========================================================================
    // Messages and secondary data
    // ========================================================================

    pub async fn get_ui_state(&self) -> UiState {
        self.ui_state.lock().await.clone()
    }

    pub async fn set_error(&self, message: String) {
        let mut state = self.ui_state.lock().await;
        state.error_message = Some(message);
        state.error_timestamp = Some(Instant::now());
    }

    pub async fn has_error(&self) -> bool {
        self.ui_state.lock().await.error_message.is_some()
    }

    pub async fn auto_clear_old_errors(&self) {
        let mut state = self.ui_state.lock().await;
        if let Some(timestamp) = state.error_timestamp {
            if timestamp.elapsed() > ERROR_DISPLAY_TIME {
                state.error_message = None;
                state.error_timestamp = None;
            }
        }
    }

    pub async fn set_notice(&self, notice: Option<String>) {
        self.ui_state.lock().await.notice = notice;
    }

    pub async fn set_stats(&self, stats: ListeningStats) {
        let mut state = self.ui_state.lock().await;
        state.stats = Some(stats);
        state.notice = None;
    }

    pub async fn set_profile(&self, profile: Profile) {
        self.ui_state.lock().await.profile = Some(profile);
    }
}

impl Default for AppModel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str, title: &str) -> Track {
        Track {
            id: id.into(),
            title: title.to_string(),
            duration: "1:00".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_catalog_for_dismissed_view_is_discarded() {
        let model = AppModel::new();
        let stale = model.mount().await;
        let current = model.mount().await;

        assert!(!model.apply_catalog(stale, vec![track("a", "A")]).await);
        assert_eq!(model.catalog_len().await, 0);

        assert!(model.apply_catalog(current, vec![track("b", "B")]).await);
        assert_eq!(model.catalog_len().await, 1);
        assert!(!model.is_loading().await);

        model.unmount().await;
        assert!(!model.is_current(current).await);
        assert!(!model.apply_catalog(current, vec![track("c", "C")]).await);
    }

    #[tokio::test]
    async fn test_visible_rows_follow_facets_and_badges() {
        let model = AppModel::new();
        let generation = model.mount().await;
        model
            .apply_catalog(generation, vec![track("b", "Beta"), track("a", "Alpha")])
            .await;

        let rows = model.visible_rows().await;
        let titles: Vec<&str> = rows.iter().map(|r| r.track.title.as_str()).collect();
        assert_eq!(titles, ["Alpha", "Beta"]);
        assert!(rows.iter().all(|r| !r.favorite));

        model.update_search_query("bet".to_string()).await;
        let rows = model.visible_rows().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].track.id, TrackId::from("b"));
    }

    #[tokio::test]
    async fn test_genre_and_sort_setters_update_rows() {
        let model = AppModel::new();
        let generation = model.mount().await;
        let mut old = track("o", "Old");
        old.genre = "Indie".to_string();
        old.release_year = 1999;
        let mut new = track("n", "New");
        new.genre = "Indie".to_string();
        new.release_year = 2021;
        let mut other = track("p", "Pop Song");
        other.genre = "Pop".to_string();
        other.release_year = 2024;
        model.apply_catalog(generation, vec![old, new, other]).await;

        model.set_genre(GenreFilter::from("Indie")).await;
        model.set_sort_key(SortKey::Year).await;
        let facets = model.facets().await;
        assert_eq!(facets.genre, GenreFilter::Only("Indie".to_string()));
        assert_eq!(facets.sort_key, SortKey::Year);

        let rows = model.visible_rows().await;
        let ids: Vec<&str> = rows.iter().map(|r| r.track.id.as_str()).collect();
        assert_eq!(ids, ["n", "o"]);

        model.set_genre(GenreFilter::All).await;
        model.set_sort_key(SortKey::Title).await;
        let rows = model.visible_rows().await;
        let titles: Vec<&str> = rows.iter().map(|r| r.track.title.as_str()).collect();
        assert_eq!(titles, ["New", "Old", "Pop Song"]);
    }

    #[tokio::test]
    async fn test_unmount_empties_favorites() {
        let model = AppModel::new();
        let generation = model.mount().await;
        model.apply_catalog(generation, vec![track("a", "A")]).await;
        let gateway = crate::model::FakeGateway {
            favorites: std::sync::Mutex::new(vec!["a".into()]),
            ..Default::default()
        };
        model.favorites().load(&gateway, &crate::model::signed_in()).await.unwrap();
        assert!(model.favorites().is_favorite(&"a".into()).await);

        model.unmount().await;
        assert!(model.favorites().is_empty().await);
    }

    #[tokio::test]
    async fn test_find_track_shares_catalog_entry() {
        let model = AppModel::new();
        let generation = model.mount().await;
        model.apply_catalog(generation, vec![track("a", "A")]).await;

        let found = model.find_track(&"a".into()).await.unwrap();
        let again = model.find_track(&"a".into()).await.unwrap();
        assert!(Arc::ptr_eq(&found, &again));
        assert!(model.find_track(&"zz".into()).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_errors_clear_after_display_time() {
        let model = AppModel::new();
        model.set_error("Failed to load songs (500)".to_string()).await;
        model.auto_clear_old_errors().await;
        assert!(model.has_error().await);

        tokio::time::advance(Duration::from_secs(6)).await;
        model.auto_clear_old_errors().await;
        assert!(!model.has_error().await);
    }
}
