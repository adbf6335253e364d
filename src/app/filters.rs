// src/app/filters.rs — predicates shared by the browse grid and the
// favorites view.

/// A movie passes when its genre set intersects the selection; an empty
/// selection passes everything.
pub fn genre_match(genre_ids: &[u64], selected: &[u64]) -> bool {
    selected.is_empty() || genre_ids.iter().any(|id| selected.contains(id))
}

/// Case-insensitive substring match on the title; blank queries pass.
pub fn title_match(title: &str, query: &str) -> bool {
    let q = query.trim();
    q.is_empty() || title.to_lowercase().contains(&q.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_selection_passes_all() {
        assert!(genre_match(&[28, 12], &[]));
        assert!(genre_match(&[], &[]));
    }

    #[test]
    fn intersection_required_when_selected() {
        assert!(genre_match(&[28, 12], &[12, 99]));
        assert!(!genre_match(&[28, 12], &[35]));
        assert!(!genre_match(&[], &[35]));
    }

    #[test]
    fn title_match_is_case_insensitive_substring() {
        assert!(title_match("The Matrix Reloaded", "matrix"));
        assert!(title_match("The Matrix Reloaded", "  MATRIX  "));
        assert!(!title_match("The Matrix Reloaded", "revolutions"));
        assert!(title_match("anything", ""));
    }
}
