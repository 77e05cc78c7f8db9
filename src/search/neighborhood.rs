//! # Deletion Neighborhoods
//!
//! The deletion neighborhood of a word at distance D is every string
//! reachable by deleting up to D characters, the word itself included.
//! Indexing these for each dictionary word (and generating them for each
//! query) reduces approximate lookup to exact hash lookups.
//!
//! Generation is an explicit breadth-first worklist over deletion depth
//! with a seen-set, not a recursion: the naive recursive expansion
//! revisits the same reduced string once per deletion order, which is
//! combinatorial in (word length choose distance) and overflows the stack
//! for generous distances. The distance is additionally capped at
//! [`MAX_FUZZY_DISTANCE`].

use hashbrown::HashSet;

use crate::config::MAX_FUZZY_DISTANCE;

/// All strings reachable from `word` by at most `distance` character
/// deletions, `word` first, each string listed once.
pub fn deletion_neighborhood(word: &str, distance: u32) -> Vec<String> {
    let distance = distance.min(MAX_FUZZY_DISTANCE);

    let mut out = vec![word.to_string()];
    let mut seen: HashSet<String> = HashSet::new();
    seen.insert(word.to_string());

    let mut frontier = vec![word.to_string()];
    for _ in 0..distance {
        let mut next = Vec::new();
        for w in &frontier {
            let chars: Vec<char> = w.chars().collect();
            for skip in 0..chars.len() {
                let reduced: String = chars
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != skip)
                    .map(|(_, c)| c)
                    .collect();
                if seen.insert(reduced.clone()) {
                    out.push(reduced.clone());
                    next.push(reduced);
                }
            }
        }
        if next.is_empty() {
            break;
        }
        frontier = next;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_zero_is_word_itself() {
        assert_eq!(deletion_neighborhood("abc", 0), vec!["abc"]);
    }

    #[test]
    fn distance_one_deletes_each_position() {
        let n = deletion_neighborhood("abc", 1);
        assert_eq!(n, vec!["abc", "bc", "ac", "ab"]);
    }

    #[test]
    fn neighbors_are_unique() {
        // "aaa" collapses to one string per depth
        assert_eq!(deletion_neighborhood("aaa", 2), vec!["aaa", "aa", "a"]);
    }

    #[test]
    fn distance_exceeding_word_length_bottoms_out() {
        let n = deletion_neighborhood("ab", 4);
        assert_eq!(n, vec!["ab", "b", "a", ""]);
    }

    #[test]
    fn distance_two_reaches_two_deletions() {
        let n = deletion_neighborhood("abcd", 2);
        assert!(n.contains(&"bd".to_string()));
        assert!(n.contains(&"ab".to_string()));
        assert!(!n.contains(&"a".to_string()));
    }

    #[test]
    fn multibyte_characters_delete_whole_codepoints() {
        let n = deletion_neighborhood("öl", 1);
        assert_eq!(n, vec!["öl", "l", "ö"]);
    }

    #[test]
    fn distance_is_capped() {
        let capped = deletion_neighborhood("abcdefgh", u32::MAX);
        let at_cap = deletion_neighborhood("abcdefgh", MAX_FUZZY_DISTANCE);
        assert_eq!(capped, at_cap);
    }
}
