//! Inexact goal-name matching.
//!
//! Scores two normalized keys with a Ratcliff/Obershelp longest-matching-
//! blocks ratio: find the longest common contiguous block, recurse on the
//! pieces to its left and right, and return `2·M / (len(a) + len(b))` where
//! `M` is the total matched length.  The acceptance thresholds in
//! [`min_score_for`] were tuned against this ratio's score distribution, so
//! a generic edit distance is not a drop-in replacement.

/// Additive boost applied when one normalized key contains the other.
pub const CONTAINS_BONUS: f64 = 0.08;

/// Ratcliff/Obershelp similarity ratio between two strings, in `[0, 1]`.
///
/// Lengths are counted in characters, not bytes, so keys containing
/// non-ASCII letters score the same as their visual length suggests.
/// Two empty strings are considered identical.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched = matched_len(&a, &b);
    2.0 * matched as f64 / total as f64
}

/// Similarity ratio plus the containment bonus, capped at `1.0`.
///
/// The bonus rewards queries that are a prefix/suffix/fragment of a stored
/// key (or vice versa), e.g. `"daily standup"` against
/// `"daily standup meeting"`.
pub fn score(query: &str, candidate: &str) -> f64 {
    let mut s = ratio(query, candidate);
    if !query.is_empty()
        && !candidate.is_empty()
        && (candidate.contains(query) || query.contains(candidate))
    {
        s = (s + CONTAINS_BONUS).min(1.0);
    }
    s
}

/// Minimum score required to accept a fuzzy match between `a` and `b`.
///
/// Short keys have a high chance of accidental similarity, so they must be
/// near-exact; longer keys tolerate more drift before being treated as the
/// same goal.
pub fn min_score_for(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len <= 6 {
        0.92
    } else if max_len <= 12 {
        0.86
    } else {
        0.80
    }
}

/// Total length of all matching blocks between `a` and `b`.
fn matched_len(a: &[char], b: &[char]) -> usize {
    let (i, j, k) = longest_block(a, b);
    if k == 0 {
        return 0;
    }
    k + matched_len(&a[..i], &b[..j]) + matched_len(&a[i + k..], &b[j + k..])
}

/// Longest common contiguous block of `a` and `b` as `(start_a, start_b,
/// len)`.  Ties are broken toward the earliest position in `a`, then `b`.
fn longest_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    // lengths[j] = length of the common suffix ending at (i-1, j-1).
    let mut lengths = vec![0usize; b.len() + 1];
    for (i, &ca) in a.iter().enumerate() {
        let mut next = vec![0usize; b.len() + 1];
        for (j, &cb) in b.iter().enumerate() {
            if ca == cb {
                let k = lengths[j] + 1;
                next[j + 1] = k;
                if k > best.2 {
                    best = (i + 1 - k, j + 1 - k, k);
                }
            }
        }
        lengths = next;
    }
    best
}
