// src/app/favorites.rs
use std::fs;
use std::io::{self, ErrorKind};
use std::path::PathBuf;

use tracing::warn;

use crate::app::filters::{genre_match, title_match};
use crate::app::types::{Movie, Toast};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FavoriteChange {
    Added,
    Removed,
}

impl FavoriteChange {
    pub const fn message(self) -> &'static str {
        match self {
            Self::Added => "Added to favorites",
            Self::Removed => "Removed from favorites",
        }
    }
}

/// The favorites set. The in-memory copy is authoritative for the session;
/// every mutation flushes the full snapshot to disk before returning.
pub struct Favorites {
    movies: Vec<Movie>,
    path: PathBuf,
}

impl Favorites {
    pub fn load_default() -> Self {
        Self::load_from(crate::app::posters::cache_dir().join("favorites.json"))
    }

    pub fn load_from(path: PathBuf) -> Self {
        let movies = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|err| {
                warn!("Favorites snapshot unreadable ({err}); starting empty.");
                Vec::new()
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => Vec::new(),
            Err(err) => {
                warn!("Failed to read {}: {err}", path.display());
                Vec::new()
            }
        };
        Self { movies, path }
    }

    fn flush(&self) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let data = serde_json::to_vec_pretty(&self.movies)
            .map_err(|err| io::Error::new(ErrorKind::Other, err))?;
        fs::write(&tmp, data)?;
        fs::rename(tmp, &self.path)
    }

    fn flush_logged(&self) {
        if let Err(err) = self.flush() {
            warn!("Failed to persist favorites to {}: {err}", self.path.display());
        }
    }

    // ---- queries ----

    pub fn is_favorite(&self, id: u64) -> bool {
        self.movies.iter().any(|m| m.id == id)
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn all(&self) -> &[Movie] {
        &self.movies
    }

    /// Favorites view filter: title substring AND genre intersection,
    /// the same predicates the browse grid uses.
    pub fn filtered(&self, query: &str, selected_genres: &[u64]) -> Vec<&Movie> {
        self.movies
            .iter()
            .filter(|m| genre_match(&m.genre_ids, selected_genres))
            .filter(|m| title_match(&m.title, query))
            .collect()
    }

    // ---- mutations (each one persists before returning) ----

    pub fn toggle(&mut self, movie: &Movie) -> FavoriteChange {
        let change = match self.movies.iter().position(|m| m.id == movie.id) {
            Some(pos) => {
                self.movies.remove(pos);
                FavoriteChange::Removed
            }
            None => {
                self.movies.push(movie.clone());
                FavoriteChange::Added
            }
        };
        self.flush_logged();
        change
    }

    /// Explicit removal from the Favorites view. Removing an id that is
    /// already gone still persists and still reads as removed; the caller
    /// surfaces the toast either way.
    pub fn remove(&mut self, id: u64) -> FavoriteChange {
        self.movies.retain(|m| m.id != id);
        self.flush_logged();
        FavoriteChange::Removed
    }
}

impl crate::app::MarqueeApp {
    pub(crate) fn toggle_favorite(&mut self, movie: &Movie) {
        let change = self.favorites.toggle(movie);
        self.toast = Some(Toast::new(change.message()));
    }

    pub(crate) fn remove_favorite(&mut self, id: u64) {
        let change = self.favorites.remove(id);
        self.toast = Some(Toast::new(change.message()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: u64, title: &str, genre_ids: &[u64]) -> Movie {
        let genres = genre_ids
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        serde_json::from_str(&format!(
            r#"{{"id": {id}, "title": "{title}", "genre_ids": [{genres}]}}"#
        ))
        .unwrap()
    }

    fn scratch() -> (tempfile::TempDir, Favorites) {
        let dir = tempfile::tempdir().unwrap();
        let favs = Favorites::load_from(dir.path().join("favorites.json"));
        (dir, favs)
    }

    #[test]
    fn toggle_twice_restores_membership() {
        let (_dir, mut favs) = scratch();
        let m = movie(1, "A", &[28]);

        assert_eq!(favs.toggle(&m), FavoriteChange::Added);
        assert!(favs.is_favorite(1));
        assert_eq!(favs.toggle(&m), FavoriteChange::Removed);
        assert!(!favs.is_favorite(1));

        // even counts always come back to the original state
        for _ in 0..4 {
            favs.toggle(&m);
        }
        assert!(!favs.is_favorite(1));
    }

    #[test]
    fn remove_is_idempotent_and_always_reads_removed() {
        let (_dir, mut favs) = scratch();
        favs.toggle(&movie(1, "A", &[]));

        assert_eq!(favs.remove(1), FavoriteChange::Removed);
        assert!(!favs.is_favorite(1));
        assert_eq!(favs.remove(1), FavoriteChange::Removed);
        assert!(favs.is_empty());
    }

    #[test]
    fn genre_and_text_filters_combine() {
        let (_dir, mut favs) = scratch();
        favs.toggle(&movie(1, "A", &[28]));
        favs.toggle(&movie(2, "B", &[35]));

        let visible = favs.filtered("", &[28]);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, 1);

        // empty selection passes all, text narrows
        let visible = favs.filtered("b", &[]);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, 2);

        // AND of both
        assert!(favs.filtered("b", &[28]).is_empty());
        assert_eq!(favs.filtered("", &[]).len(), 2);
    }

    #[test]
    fn snapshot_round_trips_element_wise() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("favorites.json");

        let mut favs = Favorites::load_from(path.clone());
        let a: Movie = serde_json::from_str(
            r#"{"id": 1, "title": "A", "poster_path": "/a.jpg",
                "release_date": "2001-05-18", "vote_average": 8.2,
                "genre_ids": [28, 12]}"#,
        )
        .unwrap();
        let b = movie(2, "B", &[35]);
        favs.toggle(&a);
        favs.toggle(&b);

        let reloaded = Favorites::load_from(path);
        assert_eq!(reloaded.all(), favs.all());
        assert_eq!(reloaded.all()[0], a);
    }

    #[test]
    fn unparsable_snapshot_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("favorites.json");
        fs::write(&path, b"not json at all").unwrap();

        let favs = Favorites::load_from(path);
        assert!(favs.is_empty());
    }
}
