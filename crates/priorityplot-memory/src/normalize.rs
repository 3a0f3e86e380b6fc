//! Goal-name canonicalisation.
//!
//! Free-form goal names are reduced to a normalized key before any matching
//! or storage: lowercased, punctuation replaced by spaces, runs of
//! whitespace collapsed.  The empty key is a sentinel meaning "nothing to
//! match" and is never stored.

/// Canonicalise a goal name into its matching key.
///
/// Lowercases the input, replaces every character that is neither
/// alphanumeric nor whitespace with a space, collapses consecutive
/// whitespace, and trims.  Idempotent: normalizing an already-normalized
/// key is a no-op.
pub fn normalize(text: &str) -> String {
    let mut key = String::with_capacity(text.len());
    let mut pending_space = false;
    for ch in text.to_lowercase().chars() {
        if ch.is_alphanumeric() {
            if pending_space && !key.is_empty() {
                key.push(' ');
            }
            pending_space = false;
            key.push(ch);
        } else {
            // Whitespace and punctuation both separate words.
            pending_space = true;
        }
    }
    key
}
