//! Fuzzy name similarity for team matching.
//!
//! The combined score is the plain average of three 0-100 metrics:
//! token-sort ratio, partial ratio and Jaro-Winkler. Names are normalized
//! first (lowercase, alphanumeric words only, city shorthand expanded) so
//! "LA Lakers" and "Los Angeles Lakers" compare as the same string.

use strsim::jaro;

use super::canonical::expand_city;

/// Lowercase, split on anything non-alphanumeric, expand city shorthand.
pub fn normalize_name(name: &str) -> String {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let lower = word.to_lowercase();
            match expand_city(&lower) {
                Some(city) => city.to_lowercase(),
                None => lower,
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Length of the longest common subsequence.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut row = vec![0usize; b.len() + 1];
    for &ca in a {
        let mut diagonal = 0;
        for (j, &cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == cb {
                diagonal + 1
            } else {
                above.max(row[j])
            };
            diagonal = above;
        }
    }
    row[b.len()]
}

/// Indel ratio on 0-100: `2 * lcs / (len_a + len_b)`.
///
/// Only insertions and deletions count, so a substitution costs two edits.
fn indel_ratio(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    200.0 * lcs_len(a, b) as f64 / total as f64
}

fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    indel_ratio(&a, &b)
}

/// Ratio after sorting each string's words alphabetically.
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    fn sorted(s: &str) -> String {
        let mut words: Vec<&str> = s.split_whitespace().collect();
        words.sort_unstable();
        words.join(" ")
    }
    ratio(&sorted(a), &sorted(b))
}

/// Best ratio of the shorter string against windows of the longer one.
///
/// Windows are the shorter string's length, plus the tails of the longer
/// string that run out before filling a full window.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    if short.is_empty() {
        return if long.is_empty() { 100.0 } else { 0.0 };
    }

    (0..long.len())
        .map(|start| {
            let end = (start + short.len()).min(long.len());
            indel_ratio(&short, &long[start..end])
        })
        .fold(0.0, f64::max)
}

/// Jaro-Winkler similarity on 0-1.
///
/// The prefix bonus covers up to four characters at a scale of 0.1 and is
/// applied regardless of the base Jaro score.
pub fn jaro_winkler(a: &str, b: &str) -> f64 {
    let base = jaro(a, b);
    let prefix = a
        .chars()
        .zip(b.chars())
        .take(4)
        .take_while(|(x, y)| x == y)
        .count() as f64;

    base + prefix * 0.1 * (1.0 - base)
}

/// Average of the three metrics on already-normalized names.
///
/// Token-sort and partial ratios enter as whole percentages, rounded half to
/// even.
pub fn combined_normalized(a: &str, b: &str) -> f64 {
    let token_sort = token_sort_ratio(a, b).round_ties_even();
    let partial = partial_ratio(a, b).round_ties_even();
    (token_sort + partial + jaro_winkler(a, b) * 100.0) / 3.0
}

/// Similarity of two team names on 0-100.
pub fn combined_score(a: &str, b: &str) -> f64 {
    combined_normalized(&normalize_name(a), &normalize_name(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn normalize_expands_city_shorthand() {
        assert_eq!(normalize_name("LA Lakers"), "los angeles lakers");
        assert_eq!(normalize_name("  NY   Knicks!"), "new york knicks");
        assert_eq!(normalize_name("Philadelphia 76ers"), "philadelphia 76ers");
    }

    #[test]
    fn la_lakers_matches_los_angeles_lakers() {
        assert!(combined_score("LA Lakers", "Los Angeles Lakers") > 90.0);
    }

    #[test]
    fn different_franchises_stay_apart() {
        assert!(combined_score("Boston Celtics", "Sacramento Kings") < 90.0);
        assert!(combined_score("Los Angeles Clippers", "Los Angeles Lakers") < 90.0);
        assert!(combined_score("New York Knicks", "New Orleans Pelicans") < 90.0);
    }

    #[test]
    fn identical_names_score_100() {
        assert!(approx(combined_score("Miami Heat", "miami heat"), 100.0));
    }

    #[test]
    fn token_sort_ignores_word_order() {
        assert!(approx(token_sort_ratio("lakers los angeles", "los angeles lakers"), 100.0));
    }

    #[test]
    fn ratios_count_substitutions_as_two_edits() {
        // lcs("kitten", "sitting") = 4, so 2 * 4 / 13
        assert!(approx(token_sort_ratio("kitten", "sitting"), 61.54));
        assert!(approx(ratio("abc", "abd"), 66.67));
        assert!(approx(ratio("", ""), 100.0));
    }

    #[test]
    fn partial_ratio_scores_clipped_tails() {
        // best window is the tail "ab" against "abc"
        assert!(approx(partial_ratio("abc", "xxxxab"), 80.0));
    }

    #[test]
    fn partial_ratio_finds_contained_name() {
        assert!(approx(partial_ratio("lakers", "los angeles lakers"), 100.0));
        assert!(approx(partial_ratio("", ""), 100.0));
        assert!(approx(partial_ratio("", "heat"), 0.0));
    }

    #[test]
    fn jaro_winkler_textbook_values() {
        // MARTHA / MARHTA: jaro 0.944, three-char prefix
        assert!((jaro_winkler("martha", "marhta") - 0.9611).abs() < 0.001);
        // DIXON / DICKSONX
        assert!((jaro_winkler("dixon", "dicksonx") - 0.8133).abs() < 0.001);
        assert!(approx(jaro_winkler("abc", "xyz"), 0.0));
        assert!(approx(jaro_winkler("", "abc"), 0.0));
    }
}
