//! Spell checking for "did you mean" hints.
//!
//! When the interpreter encounters a reference to a name that is not defined,
//! the diagnostic is much more useful if it suggests defined names that are
//! spelled similarly. This module provides the similarity search: it computes
//! the Levenshtein edit distance between the unknown name and every candidate,
//! and returns the closest candidates first.

/// A candidate word together with its edit distance from the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    word: String,
    distance: usize,
}

impl Suggestion {
    /// The suggested word.
    pub fn word(&self) -> &str {
        &self.word
    }

    /// Edit distance between the suggested word and the query.
    pub fn distance(&self) -> usize {
        self.distance
    }
}

/// Find words in the candidate list that are close to the query.
///
/// Candidates are returned sorted by distance, ties broken alphabetically.
/// Candidates further than [MAX_DISTANCE] edits away are not returned at all;
/// suggesting them would be noise.
pub fn find_close_words<T: AsRef<str>>(candidates: &[T], query: &str) -> Vec<Suggestion> {
    let mut suggestions: Vec<Suggestion> = candidates
        .iter()
        .map(AsRef::as_ref)
        .filter_map(|word| {
            let distance = levenshtein_distance(word, query);
            (distance <= MAX_DISTANCE).then(|| Suggestion {
                word: word.to_string(),
                distance,
            })
        })
        .collect();
    suggestions.sort_by(|a, b| (a.distance, &a.word).cmp(&(b.distance, &b.word)));
    suggestions
}

/// Maximum edit distance at which a candidate is still considered close.
pub const MAX_DISTANCE: usize = 3;

/// Compute the Levenshtein edit distance between two strings.
///
/// Uses the standard two-row dynamic program; the full edit matrix is never
/// materialized.
pub fn levenshtein_distance(left: &str, right: &str) -> usize {
    let left: Vec<char> = left.chars().collect();
    let right: Vec<char> = right.chars().collect();
    if left.is_empty() {
        return right.len();
    }

    let mut previous_row: Vec<usize> = (0..=right.len()).collect();
    let mut current_row: Vec<usize> = vec![0; right.len() + 1];

    for (i, left_char) in left.iter().enumerate() {
        current_row[0] = i + 1;
        for (j, right_char) in right.iter().enumerate() {
            let substitution_cost = usize::from(left_char != right_char);
            current_row[j + 1] = std::cmp::min(
                std::cmp::min(current_row[j] + 1, previous_row[j + 1] + 1),
                previous_row[j] + substitution_cost,
            );
        }
        std::mem::swap(&mut previous_row, &mut current_row);
    }
    previous_row[right.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_base_cases() {
        assert_eq!(levenshtein_distance("", ""), 0);
        assert_eq!(levenshtein_distance("", "abc"), 3);
        assert_eq!(levenshtein_distance("abc", ""), 3);
        assert_eq!(levenshtein_distance("abc", "abc"), 0);
    }

    #[test]
    fn distance_edits() {
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("gls", "Gls"), 1);
        assert_eq!(levenshtein_distance("newglossaryentry", "newglosaryentry"), 1);
    }

    #[test]
    fn close_words_sorted_by_distance() {
        let candidates = ["gls", "glspl", "newglossaryentry", "let"];
        let suggestions = find_close_words(&candidates, "glspl");
        let words: Vec<&str> = suggestions.iter().map(Suggestion::word).collect();
        assert_eq!(words, vec!["glspl", "gls"]);
    }

    #[test]
    fn far_words_are_dropped() {
        let candidates = ["newglossaryentry"];
        assert_eq!(find_close_words(&candidates, "x"), vec![]);
    }
}
