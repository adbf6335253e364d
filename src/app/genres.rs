// src/app/genres.rs — id→name genre mapping, fetched once per session.
use std::collections::HashMap;
use std::sync::mpsc;

use itertools::Itertools;
use tracing::warn;

use crate::app::types::{Genre, GenreVocabMsg};

#[derive(Default)]
pub struct GenreVocab {
    list: Vec<Genre>,
    map: HashMap<u64, String>,
    loaded: bool,
}

impl GenreVocab {
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn apply(&mut self, genres: Vec<Genre>) {
        self.map = genres.iter().map(|g| (g.id, g.name.clone())).collect();
        self.list = genres;
        self.loaded = true;
    }

    /// All genres in vocabulary order, for the filter dropdown.
    pub fn all(&self) -> &[Genre] {
        &self.list
    }

    pub fn name(&self, id: u64) -> Option<&str> {
        self.map.get(&id).map(String::as_str)
    }

    /// Display names for a set of ids, comma-joined. Ids the vocabulary
    /// does not know are omitted, never an error.
    pub fn joined_names(&self, ids: &[u64]) -> String {
        ids.iter().filter_map(|id| self.name(*id)).join(", ")
    }
}

impl crate::app::MarqueeApp {
    /// Kick off the one-shot vocabulary fetch. Safe to call every frame;
    /// only the first call spawns anything, and the session never refetches.
    pub(crate) fn ensure_genre_vocab(&mut self) {
        if self.vocab.is_loaded() || self.genre_rx.is_some() {
            return;
        }
        let (tx, rx) = mpsc::channel::<GenreVocabMsg>();
        self.genre_rx = Some(rx);

        let client = self.client.clone();
        std::thread::spawn(move || {
            let msg = match client.genre_list() {
                Ok(genres) => GenreVocabMsg::Loaded(genres),
                Err(e) => GenreVocabMsg::Failed(e),
            };
            let _ = tx.send(msg);
        });
    }

    pub(crate) fn poll_genre_vocab(&mut self) {
        let Some(rx) = self.genre_rx.as_ref() else {
            return;
        };
        match rx.try_recv() {
            Ok(GenreVocabMsg::Loaded(genres)) => {
                self.vocab.apply(genres);
                self.genre_rx = None;
            }
            Ok(GenreVocabMsg::Failed(e)) => {
                // Empty vocabulary: filters still render, names just omit.
                warn!("Genre vocabulary fetch failed: {e}");
                self.vocab.apply(Vec::new());
                self.genre_rx = None;
            }
            Err(mpsc::TryRecvError::Empty) => {}
            Err(mpsc::TryRecvError::Disconnected) => {
                self.genre_rx = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> GenreVocab {
        let mut v = GenreVocab::default();
        v.apply(vec![
            Genre {
                id: 28,
                name: "Action".into(),
            },
            Genre {
                id: 35,
                name: "Comedy".into(),
            },
        ]);
        v
    }

    #[test]
    fn joined_names_omits_unknown_ids() {
        let v = vocab();
        assert_eq!(v.joined_names(&[28, 99, 35]), "Action, Comedy");
        assert_eq!(v.joined_names(&[99]), "");
        assert_eq!(v.joined_names(&[]), "");
    }

    #[test]
    fn lookup_is_total() {
        let v = vocab();
        assert_eq!(v.name(28), Some("Action"));
        assert_eq!(v.name(12345), None);
    }
}
