// src/app/listing.rs — view-mode state machine behind the browse grid.
//
// Pure state: callers get a `FetchAction` back and do the network I/O
// themselves, then feed the outcome in via `*_loaded` / `load_failed`.
// Popular / SearchResults / GenreFiltered are mutually exclusive; entering
// one clears the others' derived state before any request goes out.

use crate::app::types::{FetchKind, Movie};
use crate::tmdb::PAGE_SIZE;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewMode {
    Popular { page: u32, total_pages: u32 },
    SearchResults { visible: usize },
    GenreFiltered,
}

/// Network work the app must perform after a state transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchAction {
    Popular { page: u32 },
    Discover { genre_ids: Vec<u64> },
}

pub struct Listing {
    movies: Vec<Movie>,
    search_all: Vec<Movie>,
    selected_genres: Vec<u64>,
    view: ViewMode,
    loading: bool,
}

impl Default for Listing {
    fn default() -> Self {
        Self {
            movies: Vec::new(),
            search_all: Vec::new(),
            selected_genres: Vec::new(),
            view: ViewMode::Popular {
                page: 0,
                total_pages: 1,
            },
            loading: false,
        }
    }
}

impl Listing {
    // ---- accessors ----

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn is_search(&self) -> bool {
        matches!(self.view, ViewMode::SearchResults { .. })
    }

    pub fn is_genre_filter(&self) -> bool {
        matches!(self.view, ViewMode::GenreFiltered)
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn selected_genres(&self) -> &[u64] {
        &self.selected_genres
    }

    /// The slice the grid renders right now.
    pub fn visible(&self) -> &[Movie] {
        match self.view {
            ViewMode::SearchResults { visible } => &self.search_all[..visible],
            _ => &self.movies,
        }
    }

    /// Whether the "Load More" affordance should be offered.
    pub fn can_load_more(&self) -> bool {
        if self.loading {
            return false;
        }
        match self.view {
            ViewMode::Popular { page, total_pages } => page < total_pages,
            ViewMode::SearchResults { visible } => visible < self.search_all.len(),
            ViewMode::GenreFiltered => false,
        }
    }

    // ---- entry points (mutually exclusive) ----

    /// Reset to the Popular view at page 1, dropping search results and the
    /// genre selection. The previous view's state is gone before the
    /// returned fetch is issued.
    pub fn begin_popular(&mut self) -> FetchAction {
        self.movies.clear();
        self.search_all.clear();
        self.selected_genres.clear();
        self.view = ViewMode::Popular {
            page: 0,
            total_pages: 1,
        };
        self.loading = true;
        FetchAction::Popular { page: 1 }
    }

    /// Switch to search results. The fetch already happened upstream (the
    /// navbar owns the query); this just takes ownership of the full list
    /// and exposes it in slices of `PAGE_SIZE`.
    pub fn apply_search(&mut self, results: Vec<Movie>) {
        self.movies.clear();
        self.selected_genres.clear();
        let visible = results.len().min(PAGE_SIZE);
        self.search_all = results;
        self.view = ViewMode::SearchResults { visible };
        self.loading = false;
    }

    /// Replace the genre selection. Non-empty switches to GenreFiltered and
    /// asks for one discover query over all ids (server-side OR); empty
    /// reverts to Popular page 1.
    pub fn set_genre_filter(&mut self, genre_ids: Vec<u64>) -> FetchAction {
        let mut deduped: Vec<u64> = Vec::with_capacity(genre_ids.len());
        for id in genre_ids {
            if !deduped.contains(&id) {
                deduped.push(id);
            }
        }

        if deduped.is_empty() {
            return self.begin_popular();
        }

        self.movies.clear();
        self.search_all.clear();
        self.selected_genres = deduped;
        self.view = ViewMode::GenreFiltered;
        self.loading = true;
        FetchAction::Discover {
            genre_ids: self.selected_genres.clone(),
        }
    }

    /// Flip one genre in or out of the selection.
    pub fn toggle_genre(&mut self, id: u64) -> FetchAction {
        let mut next = self.selected_genres.clone();
        match next.iter().position(|g| *g == id) {
            Some(pos) => {
                next.remove(pos);
            }
            None => next.push(id),
        }
        self.set_genre_filter(next)
    }

    // ---- load-more ----

    /// Next popular page to request, or None when exhausted / busy / not in
    /// the Popular view.
    pub fn next_page_request(&mut self) -> Option<u32> {
        if self.loading {
            return None;
        }
        match self.view {
            ViewMode::Popular { page, total_pages } if page < total_pages => {
                self.loading = true;
                Some(page + 1)
            }
            _ => None,
        }
    }

    /// Grow the visible search slice by one page worth. Returns false when
    /// the full result list is already exposed.
    pub fn reveal_more_search(&mut self) -> bool {
        if let ViewMode::SearchResults { visible } = self.view {
            if visible < self.search_all.len() {
                self.view = ViewMode::SearchResults {
                    visible: (visible + PAGE_SIZE).min(self.search_all.len()),
                };
                return true;
            }
        }
        false
    }

    // ---- fetch outcomes ----

    /// Apply a popular page. Page 1 replaces the working list; later pages
    /// append (monotonic growth, no client-side dedup).
    pub fn popular_loaded(&mut self, page: u32, mut results: Vec<Movie>, total_pages: u32) {
        if !matches!(self.view, ViewMode::Popular { .. }) {
            return;
        }
        if page <= 1 {
            self.movies = results;
        } else {
            self.movies.append(&mut results);
        }
        self.view = ViewMode::Popular {
            page,
            total_pages: total_pages.max(1),
        };
        self.loading = false;
    }

    pub fn genre_loaded(&mut self, results: Vec<Movie>) {
        if !matches!(self.view, ViewMode::GenreFiltered) {
            return;
        }
        self.movies = results;
        self.loading = false;
    }

    /// A fetch went wrong. First loads degrade to an empty working list; a
    /// failed popular load-more keeps the prior pages and re-enables the
    /// trigger.
    pub fn load_failed(&mut self, kind: FetchKind) {
        self.loading = false;
        match kind {
            FetchKind::PopularPage(page) if page > 1 => {}
            FetchKind::PopularPage(_) => self.movies.clear(),
            FetchKind::Genre => self.movies.clear(),
            FetchKind::Search => {
                self.search_all.clear();
                if let ViewMode::SearchResults { .. } = self.view {
                    self.view = ViewMode::SearchResults { visible: 0 };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::types::Movie;

    fn movie(id: u64) -> Movie {
        serde_json::from_str(&format!(r#"{{"id": {id}, "title": "m{id}"}}"#)).unwrap()
    }

    fn movies(range: std::ops::Range<u64>) -> Vec<Movie> {
        range.map(movie).collect()
    }

    #[test]
    fn popular_pages_append_and_advance_cursor() {
        let mut listing = Listing::default();
        assert_eq!(listing.begin_popular(), FetchAction::Popular { page: 1 });

        listing.popular_loaded(1, movies(0..20), 3);
        assert_eq!(listing.visible().len(), 20);
        assert_eq!(
            listing.view(),
            ViewMode::Popular {
                page: 1,
                total_pages: 3
            }
        );

        assert_eq!(listing.next_page_request(), Some(2));
        listing.popular_loaded(2, movies(20..40), 3);
        assert_eq!(listing.visible().len(), 40);
        assert_eq!(
            listing.view(),
            ViewMode::Popular {
                page: 2,
                total_pages: 3
            }
        );
    }

    #[test]
    fn next_page_is_noop_at_last_page() {
        let mut listing = Listing::default();
        listing.begin_popular();
        listing.popular_loaded(3, movies(0..20), 3);

        assert_eq!(listing.next_page_request(), None);
        assert!(!listing.can_load_more());
        assert_eq!(listing.visible().len(), 20);
    }

    #[test]
    fn next_page_is_noop_while_loading() {
        let mut listing = Listing::default();
        listing.begin_popular();
        listing.popular_loaded(1, movies(0..20), 3);

        assert_eq!(listing.next_page_request(), Some(2));
        // in flight: the second click must not issue another request
        assert_eq!(listing.next_page_request(), None);
    }

    #[test]
    fn search_slices_in_pages_of_twenty() {
        let mut listing = Listing::default();
        listing.apply_search(movies(0..45));

        assert!(listing.is_search());
        assert_eq!(listing.visible().len(), 20);
        assert!(listing.can_load_more());

        assert!(listing.reveal_more_search());
        assert_eq!(listing.visible().len(), 40);
        assert!(listing.reveal_more_search());
        assert_eq!(listing.visible().len(), 45);
        assert!(!listing.reveal_more_search());
        assert!(!listing.can_load_more());
    }

    #[test]
    fn short_search_results_fit_one_slice() {
        let mut listing = Listing::default();
        listing.apply_search(movies(0..7));
        assert_eq!(listing.visible().len(), 7);
        assert!(!listing.can_load_more());
    }

    #[test]
    fn genre_filter_clears_search_state() {
        let mut listing = Listing::default();
        listing.apply_search(movies(0..30));
        assert_eq!(listing.visible().len(), 20);

        let action = listing.set_genre_filter(vec![28]);
        assert_eq!(
            action,
            FetchAction::Discover {
                genre_ids: vec![28]
            }
        );
        assert!(listing.is_genre_filter());
        assert!(!listing.is_search());
        assert!(listing.visible().is_empty());

        listing.genre_loaded(movies(0..10));
        assert_eq!(listing.visible().len(), 10);
        // no residual search slice: going back to search starts fresh
        listing.apply_search(movies(100..105));
        assert_eq!(listing.visible().len(), 5);
        assert!(listing.selected_genres().is_empty());
    }

    #[test]
    fn search_clears_genre_state() {
        let mut listing = Listing::default();
        listing.set_genre_filter(vec![28, 35]);
        listing.genre_loaded(movies(0..10));

        listing.apply_search(movies(50..60));
        assert!(listing.is_search());
        assert!(!listing.is_genre_filter());
        assert!(listing.selected_genres().is_empty());
    }

    #[test]
    fn empty_genre_selection_reverts_to_popular() {
        let mut listing = Listing::default();
        listing.set_genre_filter(vec![28]);
        listing.genre_loaded(movies(0..10));

        let action = listing.set_genre_filter(Vec::new());
        assert_eq!(action, FetchAction::Popular { page: 1 });
        assert!(!listing.is_genre_filter());
        assert!(matches!(listing.view(), ViewMode::Popular { .. }));
    }

    #[test]
    fn toggle_genre_joins_all_selected_ids() {
        let mut listing = Listing::default();
        listing.toggle_genre(28);
        let action = listing.toggle_genre(35);
        assert_eq!(
            action,
            FetchAction::Discover {
                genre_ids: vec![28, 35]
            }
        );

        // toggling the last one off goes back to popular
        listing.toggle_genre(35);
        let action = listing.toggle_genre(28);
        assert_eq!(action, FetchAction::Popular { page: 1 });
    }

    #[test]
    fn failed_first_load_degrades_to_empty() {
        let mut listing = Listing::default();
        listing.begin_popular();
        listing.load_failed(FetchKind::PopularPage(1));
        assert!(listing.visible().is_empty());
        assert!(!listing.loading());
    }

    #[test]
    fn failed_load_more_keeps_prior_pages() {
        let mut listing = Listing::default();
        listing.begin_popular();
        listing.popular_loaded(1, movies(0..20), 3);

        assert_eq!(listing.next_page_request(), Some(2));
        listing.load_failed(FetchKind::PopularPage(2));
        assert_eq!(listing.visible().len(), 20);
        // trigger re-enabled
        assert_eq!(listing.next_page_request(), Some(2));
    }
}
