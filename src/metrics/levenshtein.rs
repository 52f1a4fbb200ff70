// levenshtein.rs - Edit distance

use super::token_matrix_reduction;

/// Compute the Levenshtein distance between `stra` and `strb`: the minimal
/// number of insertions, deletions and substitutions needed to transform one
/// into the other.
///
/// When both inputs contain whitespace the distance switches to the
/// token-matrix reduction over the space-separated tokens of each side; a
/// single-word input is always compared with the plain edit distance.
pub fn levenshtein(stra: &str, strb: &str) -> f64 {
    if stra.contains(' ') && strb.contains(' ') {
        // Per-token distances are infallible, so the reduction is too.
        return token_matrix_reduction(stra, strb, |a, b| Ok(levenshtein_simple(a, b) as f64))
            .unwrap_or(0.0);
    }
    levenshtein_simple(stra, strb) as f64
}

/// Plain two-row dynamic-programming edit distance over characters.
pub(crate) fn levenshtein_simple(stra: &str, strb: &str) -> usize {
    let a: Vec<char> = stra.chars().collect();
    let b: Vec<char> = strb.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let del_cost = previous[j + 1] + 1;
            let add_cost = current[j] + 1;
            let sub_cost = previous[j] + usize::from(ca != cb);
            current[j + 1] = del_cost.min(add_cost).min(sub_cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("niche", "chiens"), 5.0);
        assert_eq!(levenshtein("bonjour", "bonjour !"), 2.0);
        assert_eq!(levenshtein("bon", "bonjour"), 4.0);
        assert_eq!(levenshtein("bonjour", "bonjour"), 0.0);
    }

    #[test]
    fn test_levenshtein_symmetry() {
        for (a, b) in [("niche", "chiens"), ("bon", "bonjour"), ("", "abc")] {
            assert_eq!(levenshtein(a, b), levenshtein(b, a));
        }
    }

    #[test]
    fn test_levenshtein_multiword() {
        assert_eq!(levenshtein("Victor Hugo", "Victor Hugo"), 0.0);
        assert_eq!(levenshtein("Victor Jean Hugo", "Victor Hugo"), 4.0);
        // One multi-word side alone keeps the plain definition
        assert_eq!(levenshtein("Victor", "Victor Hugo"), 5.0);
    }

    #[test]
    fn test_levenshtein_empty() {
        assert_eq!(levenshtein("", ""), 0.0);
        assert_eq!(levenshtein("", "chien"), 5.0);
    }
}
