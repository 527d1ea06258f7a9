//! Edit distance and normalized similarity between strings.
//!
//! Every function here compares Unicode scalar values, never bytes, so CJK
//! and accented Latin text compare one character at a time.

use std::cmp::min;

/// Calculate the Levenshtein distance between two strings.
///
/// This is the minimum number of single-character insertions, deletions or
/// substitutions required to turn `a` into `b`. Comparison is case-sensitive.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    // Two rows are enough: row i only depends on row i - 1.
    let mut prev_row: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr_row = vec![0; b_chars.len() + 1];

    for (i, &ca) in a_chars.iter().enumerate() {
        curr_row[0] = i + 1;
        for (j, &cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr_row[j + 1] = min(
                min(
                    prev_row[j + 1] + 1, // deletion
                    curr_row[j] + 1,     // insertion
                ),
                prev_row[j] + cost, // substitution
            );
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[b_chars.len()]
}

/// Calculate the edit distance, giving up as soon as it must exceed `max`.
///
/// Returns `None` if the distance is larger than `max`.
pub fn edit_distance_within(a: &str, b: &str, max: usize) -> Option<usize> {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.len().abs_diff(b_chars.len()) > max {
        return None;
    }

    let mut prev_row: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr_row = vec![0; b_chars.len() + 1];

    for (i, &ca) in a_chars.iter().enumerate() {
        curr_row[0] = i + 1;
        let mut min_in_row = curr_row[0];

        for (j, &cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr_row[j + 1] = min(
                min(prev_row[j + 1] + 1, curr_row[j] + 1),
                prev_row[j] + cost,
            );
            min_in_row = min(min_in_row, curr_row[j + 1]);
        }

        if min_in_row > max {
            return None;
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    let distance = prev_row[b_chars.len()];
    (distance <= max).then_some(distance)
}

/// Calculate Damerau-Levenshtein (optimal string alignment) distance, which
/// counts a swap of two adjacent characters as a single edit.
#[allow(clippy::needless_range_loop)]
pub fn damerau_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let (len1, len2) = (a_chars.len(), b_chars.len());

    if len1 == 0 {
        return len2;
    }
    if len2 == 0 {
        return len1;
    }

    let mut matrix = vec![vec![0; len2 + 1]; len1 + 1];
    for i in 0..=len1 {
        matrix[i][0] = i;
    }
    for j in 0..=len2 {
        matrix[0][j] = j;
    }

    for i in 1..=len1 {
        for j in 1..=len2 {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);

            matrix[i][j] = min(
                min(matrix[i - 1][j] + 1, matrix[i][j - 1] + 1),
                matrix[i - 1][j - 1] + cost,
            );

            if i > 1
                && j > 1
                && a_chars[i - 1] == b_chars[j - 2]
                && a_chars[i - 2] == b_chars[j - 1]
            {
                matrix[i][j] = min(matrix[i][j], matrix[i - 2][j - 2] + 1);
            }
        }
    }

    matrix[len1][len2]
}

/// Normalized similarity in `[0.0, 1.0]`, case-insensitive.
///
/// `(max_len - edit_distance(lower(a), lower(b))) / max_len`, where `max_len`
/// is the longer of the two lowercased strings in characters. Two empty
/// strings are identical (`1.0`).
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let max_len = a.chars().count().max(b.chars().count());

    if max_len == 0 {
        return 1.0;
    }

    let distance = edit_distance(&a, &b);
    (max_len - distance) as f64 / max_len as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("", ""), 0);
        assert_eq!(edit_distance("", "a"), 1);
        assert_eq!(edit_distance("a", ""), 1);
        assert_eq!(edit_distance("ab", "ac"), 1);
        assert_eq!(edit_distance("abc", "def"), 3);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("search", "serach"), 2);
    }

    #[test]
    fn test_edit_distance_is_case_sensitive() {
        assert_eq!(edit_distance("OpenAI", "openai"), 2);
        assert_eq!(edit_distance("OpenAl", "OpenAI"), 1);
    }

    #[test]
    fn test_edit_distance_counts_code_points() {
        // Each CJK character is three bytes in UTF-8 but one edit.
        assert_eq!(edit_distance("人工智能", "人工知能"), 1);
        assert_eq!(edit_distance("café", "cafe"), 1);
        assert_eq!(edit_distance("", "新闻"), 2);
    }

    #[test]
    fn test_identity() {
        for s in ["", "a", "OpenAI", "人工智能", "machine learning"] {
            assert_eq!(edit_distance(s, s), 0);
            assert!((similarity(s, s) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_edit_distance_within() {
        assert_eq!(edit_distance_within("kitten", "sitting", 3), Some(3));
        assert_eq!(edit_distance_within("kitten", "sitting", 2), None);
        assert_eq!(edit_distance_within("search", "search", 0), Some(0));
        assert_eq!(edit_distance_within("a", "abc", 1), None);
        assert_eq!(edit_distance_within("a", "ab", 1), Some(1));
    }

    #[test]
    fn test_damerau_distance() {
        assert_eq!(damerau_distance("", ""), 0);
        assert_eq!(damerau_distance("ab", "ba"), 1);
        assert_eq!(damerau_distance("search", "serach"), 1);
        assert_eq!(damerau_distance("kitten", "sitting"), 3);
        assert!(damerau_distance("nvidia", "nvdiia") <= edit_distance("nvidia", "nvdiia"));
    }

    #[test]
    fn test_similarity() {
        assert!((similarity("", "") - 1.0).abs() < 1e-12);
        assert!((similarity("abc", "") - 0.0).abs() < 1e-12);
        assert!((similarity("abc", "def") - 0.0).abs() < 1e-12);
        assert!((similarity("OpenAI", "openai") - 1.0).abs() < 1e-12);

        let s = similarity("OpenAl", "OpenAI");
        assert!((s - 5.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_similarity_is_symmetric() {
        let pairs = [
            ("OpenAl", "OpenAI"),
            ("kitten", "sitting"),
            ("", "news"),
            ("人工智能", "人工"),
            ("Tesla", "tesla motors"),
        ];
        for (a, b) in pairs {
            assert_eq!(similarity(a, b), similarity(b, a), "{a} vs {b}");
            assert_eq!(edit_distance(a, b), edit_distance(b, a));
        }
    }

    #[test]
    fn test_similarity_stays_in_range() {
        // Lowercasing U+0130 yields two code points.
        let s = similarity("İstanbul", "x");
        assert!((0.0..=1.0).contains(&s));
    }
}
