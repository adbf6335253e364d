// src/app/types.rs
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---- catalog records ----

/// One movie as returned by list endpoints and persisted in favorites.
/// Everything except `id` tolerates absence; partial payloads must never
/// fail decoding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub genre_ids: Vec<u64>,
}

impl Movie {
    pub fn release_year(&self) -> Option<i32> {
        release_year_of(&self.release_date)
    }
}

/// Year out of an ISO `YYYY-MM-DD` release date; anything else is None.
pub fn release_year_of(date: &str) -> Option<i32> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok().map(|d| {
        use chrono::Datelike;
        d.year()
    })
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

/// Detail payload; TMDB answers `{"success": false, ...}` for unknown ids,
/// so `success`/`id` double as the not-found signal.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct MovieDetail {
    pub id: Option<u64>,
    pub success: Option<bool>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub vote_average: f64,
}

impl MovieDetail {
    pub fn is_found(&self) -> bool {
        self.success != Some(false) && self.id.is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Video {
    #[serde(default)]
    pub site: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub key: String,
}

// ---- cross-thread messages ----

/// What a catalog fetch was for; failures need it to decide whether the
/// working list degrades to empty or the prior state is kept.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchKind {
    PopularPage(u32),
    Search,
    Genre,
}

pub enum CatalogMsg {
    Loaded {
        seq: u64,
        kind: FetchKind,
        movies: Vec<Movie>,
        total_pages: Option<u32>,
    },
    Failed {
        seq: u64,
        kind: FetchKind,
        error: String,
    },
}

pub struct SuggestMsg {
    pub seq: u64,
    pub titles: Vec<String>,
}

pub enum GenreVocabMsg {
    Loaded(Vec<Genre>),
    Failed(String),
}

pub enum DetailMsg {
    Loaded { movie_id: u64, detail: Box<MovieDetail> },
    Videos { movie_id: u64, videos: Vec<Video> },
    Failed { movie_id: u64, error: String },
}

// ---- view / phase state ----

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Browse,
    Favorites,
}

// ---- transient notification ----

pub const TOAST_DURATION: Duration = Duration::from_millis(1800);

/// Auto-dismissing notification; a new message restarts the clock
/// (last write wins, no queueing).
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub shown_at: Instant,
}

impl Toast {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
            shown_at: Instant::now(),
        }
    }

    pub fn expired_at(&self, now: Instant) -> bool {
        now.duration_since(self.shown_at) >= TOAST_DURATION
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movie_decodes_with_missing_fields() {
        let m: Movie = serde_json::from_str(r#"{"id": 603}"#).unwrap();
        assert_eq!(m.id, 603);
        assert!(m.title.is_empty());
        assert!(m.poster_path.is_none());
        assert!(m.genre_ids.is_empty());
    }

    #[test]
    fn release_year_parses_iso_dates_only() {
        let mut m: Movie = serde_json::from_str(r#"{"id": 1}"#).unwrap();
        m.release_date = "1999-03-31".into();
        assert_eq!(m.release_year(), Some(1999));
        m.release_date = String::new();
        assert_eq!(m.release_year(), None);
    }

    #[test]
    fn detail_not_found_payload() {
        let d: MovieDetail =
            serde_json::from_str(r#"{"success": false, "status_code": 34}"#).unwrap();
        assert!(!d.is_found());

        let found: MovieDetail =
            serde_json::from_str(r#"{"id": 603, "title": "The Matrix", "runtime": 136}"#).unwrap();
        assert!(found.is_found());
        assert_eq!(found.runtime, Some(136));
    }

    #[test]
    fn toast_expires_at_exactly_1800ms() {
        let toast = Toast::new("Added to favorites");
        let t0 = toast.shown_at;
        assert!(!toast.expired_at(t0 + Duration::from_millis(1799)));
        assert!(toast.expired_at(t0 + Duration::from_millis(1800)));
    }

    #[test]
    fn newer_toast_restarts_the_clock() {
        let first = Toast::new("Added to favorites");
        let t0 = first.shown_at;
        let second = Toast {
            message: "Removed from favorites".into(),
            shown_at: t0 + Duration::from_millis(1000),
        };
        let probe = t0 + Duration::from_millis(2000);
        assert!(first.expired_at(probe));
        assert!(!second.expired_at(probe));
    }
}
