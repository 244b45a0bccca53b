//! Catalog view pipeline: search, genre filter and stable sort

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::types::Track;

/// Genres offered by the catalog filter
pub const KNOWN_GENRES: [&str; 5] = ["all", "Pop", "Pop Rock", "Hip Hop", "Indie"];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Title,
    Artist,
    /// Newest first
    Year,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(SortKey::Title),
            "artist" => Ok(SortKey::Artist),
            "year" => Ok(SortKey::Year),
            other => Err(format!("unknown sort key {other:?} (expected title, artist or year)")),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum GenreFilter {
    #[default]
    All,
    /// Exact, case-sensitive genre match
    Only(String),
}

impl GenreFilter {
    pub fn matches(&self, genre: &str) -> bool {
        match self {
            GenreFilter::All => true,
            GenreFilter::Only(wanted) => wanted == genre,
        }
    }
}

impl From<&str> for GenreFilter {
    fn from(s: &str) -> Self {
        if s == "all" {
            GenreFilter::All
        } else {
            GenreFilter::Only(s.to_string())
        }
    }
}

impl fmt::Display for GenreFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenreFilter::All => f.write_str("all"),
            GenreFilter::Only(genre) => f.write_str(genre),
        }
    }
}

/// Search, filter and sort parameters applied to the catalog
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CatalogFacets {
    pub search_query: String,
    pub genre: GenreFilter,
    pub sort_key: SortKey,
}

impl CatalogFacets {
    pub fn matches(&self, track: &Track) -> bool {
        let query = self.search_query.to_lowercase();
        let matches_search = [&track.title, &track.artist, &track.album]
            .iter()
            .any(|field| field.to_lowercase().contains(&query));
        matches_search && self.genre.matches(&track.genre)
    }
}

/// Approximates a locale-aware ordering: case-folded first, raw text as tie-break
fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

fn compare(a: &Track, b: &Track, key: SortKey) -> Ordering {
    match key {
        SortKey::Title => compare_text(&a.title, &b.title),
        SortKey::Artist => compare_text(&a.artist, &b.artist),
        SortKey::Year => b.release_year.cmp(&a.release_year),
    }
}

/// Ordered display list for `catalog` under `facets`.
///
/// Pure: equal inputs give equal outputs. Entries that compare equal keep
/// their catalog order.
pub fn view<T>(catalog: &[T], facets: &CatalogFacets) -> Vec<T>
where
    T: AsRef<Track> + Clone,
{
    let mut visible: Vec<T> = catalog
        .iter()
        .filter(|&track| facets.matches(track.as_ref()))
        .cloned()
        .collect();

    // slice::sort_by is stable
    visible.sort_by(|a, b| compare(a.as_ref(), b.as_ref(), facets.sort_key));
    visible
}

impl AsRef<Track> for Track {
    fn as_ref(&self) -> &Track {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str, title: &str, artist: &str, year: i32) -> Track {
        Track {
            id: id.into(),
            title: title.to_string(),
            artist: artist.to_string(),
            release_year: year,
            ..Default::default()
        }
    }

    fn titles(tracks: &[Track]) -> Vec<&str> {
        tracks.iter().map(|t| t.title.as_str()).collect()
    }

    fn facets(search: &str, genre: &str, sort_key: SortKey) -> CatalogFacets {
        CatalogFacets {
            search_query: search.to_string(),
            genre: genre.into(),
            sort_key,
        }
    }

    fn weeknd_catalog() -> Vec<Track> {
        vec![
            track("1", "Blinding Lights", "The Weeknd", 2020),
            track("2", "Levitating", "Dua Lipa", 2020),
        ]
    }

    #[test]
    fn test_sort_by_title() {
        let catalog = vec![track("1", "B", "", 2020), track("2", "A", "", 2019)];
        let result = view(&catalog, &CatalogFacets::default());
        assert_eq!(titles(&result), ["A", "B"]);
    }

    #[test]
    fn test_sort_by_year_descending() {
        let catalog = vec![
            track("1", "Old", "", 1999),
            track("2", "New", "", 2023),
            track("3", "Unknown", "", 0),
        ];
        let result = view(&catalog, &facets("", "all", SortKey::Year));
        assert_eq!(titles(&result), ["New", "Old", "Unknown"]);
    }

    #[test]
    fn test_sort_by_artist_is_case_insensitive() {
        let catalog = vec![
            track("1", "x", "beta", 0),
            track("2", "y", "Alpha", 0),
            track("3", "z", "alpha", 0),
        ];
        let result = view(&catalog, &facets("", "all", SortKey::Artist));
        let artists: Vec<&str> = result.iter().map(|t| t.artist.as_str()).collect();
        assert_eq!(artists, ["alpha", "Alpha", "beta"]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_keys() {
        let catalog = vec![
            track("a", "Same", "", 2020),
            track("b", "Other", "", 2020),
            track("c", "Same", "", 2020),
            track("d", "Same", "", 2020),
        ];
        let by_title = view(&catalog, &CatalogFacets::default());
        let ids: Vec<&str> = by_title.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["b", "a", "c", "d"]);

        let mut permuted = catalog.clone();
        permuted.reverse();
        let by_year = view(&permuted, &facets("", "all", SortKey::Year));
        let ids: Vec<&str> = by_year.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["d", "c", "b", "a"]);
    }

    #[test]
    fn test_view_is_pure() {
        let catalog = weeknd_catalog();
        let f = facets("i", "all", SortKey::Artist);
        let first = view(&catalog, &f);
        let second = view(&catalog, &f);
        assert_eq!(first, second);
        assert_eq!(catalog, weeknd_catalog());
    }

    #[test]
    fn test_search_weekend_does_not_match_weeknd() {
        let result = view(&weeknd_catalog(), &facets("weekend", "all", SortKey::Title));
        assert!(result.iter().all(|t| t.artist != "The Weeknd"));
    }

    #[test]
    fn test_search_week_matches_weeknd() {
        let result = view(&weeknd_catalog(), &facets("week", "all", SortKey::Title));
        assert_eq!(titles(&result), ["Blinding Lights"]);
    }

    #[test]
    fn test_search_is_case_insensitive_over_title_artist_album() {
        let mut catalog = weeknd_catalog();
        catalog[1].album = "Future Nostalgia".to_string();
        assert_eq!(view(&catalog, &facets("BLINDING", "all", SortKey::Title)).len(), 1);
        assert_eq!(view(&catalog, &facets("dua", "all", SortKey::Title)).len(), 1);
        assert_eq!(view(&catalog, &facets("nostalgia", "all", SortKey::Title)).len(), 1);
        assert_eq!(view(&catalog, &facets("", "all", SortKey::Title)).len(), 2);
    }

    #[test]
    fn test_genre_filter_is_exact() {
        let mut catalog = weeknd_catalog();
        catalog[0].genre = "Pop".to_string();
        catalog[1].genre = "Pop Rock".to_string();
        assert_eq!(titles(&view(&catalog, &facets("", "Pop", SortKey::Title))), ["Blinding Lights"]);
        assert!(view(&catalog, &facets("", "pop", SortKey::Title)).is_empty());
        assert_eq!(view(&catalog, &facets("", "all", SortKey::Title)).len(), 2);
    }

    #[test]
    fn test_missing_fields_do_not_fail() {
        let catalog = vec![Track::default(), track("1", "A", "", 2000)];
        let result = view(&catalog, &facets("", "all", SortKey::Year));
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].title, "A");
        assert!(view(&catalog, &facets("a", "all", SortKey::Title)).len() == 1);
    }

    #[test]
    fn test_view_over_shared_tracks() {
        use std::sync::Arc;
        let catalog: Vec<Arc<Track>> = weeknd_catalog().into_iter().map(Arc::new).collect();
        let result = view(&catalog, &facets("dua", "all", SortKey::Title));
        assert_eq!(result.len(), 1);
        assert!(Arc::ptr_eq(&result[0], &catalog[1]));
    }

    #[test]
    fn test_parse_sort_key_and_genre() {
        assert_eq!("Year".parse::<SortKey>().unwrap(), SortKey::Year);
        assert!("rating".parse::<SortKey>().is_err());
        assert_eq!(GenreFilter::from("all"), GenreFilter::All);
        assert_eq!(GenreFilter::from("Hip Hop").to_string(), "Hip Hop");
    }
}
