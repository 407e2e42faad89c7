//! Token-sort fuzzy similarity.
//!
//! Both strings are normalized (transliterated to ASCII, lowercased,
//! punctuation turned into whitespace), their tokens sorted and re-joined,
//! and the results compared with the insert/delete ratio
//! `100 * (1 - indel / (len_a + len_b))`. Sorting makes "Doe, Jane" and
//! "Jane Doe" identical; transliteration makes "José" and "Jose" identical.

/// Two names match only when their score is strictly above this value.
pub const MATCH_THRESHOLD: u8 = 90;

/// Normalizes `text` into its sorted-token form.
#[must_use]
pub fn sorted_tokens(text: &str) -> String {
    let cleaned: String = deunicode::deunicode(text)
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .flat_map(char::to_lowercase)
        .collect();

    let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Similarity score of `a` and `b` in `0..=100`.
///
/// A string that normalizes to nothing scores 0 against everything,
/// including another empty string.
#[must_use]
pub fn token_sort_ratio(a: &str, b: &str) -> u8 {
    let a = sorted_tokens(a);
    let b = sorted_tokens(b);
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let total = a.chars().count() + b.chars().count();
    let distance = rapidfuzz::distance::indel::distance(a.chars(), b.chars());
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    {
        let score = 100.0 * total.saturating_sub(distance) as f64 / total as f64;
        score.round().clamp(0.0, 100.0) as u8
    }
}

/// Returns true if `a` and `b` score above [`MATCH_THRESHOLD`].
#[must_use]
pub fn is_similar(a: &str, b: &str) -> bool {
    token_sort_ratio(a, b) > MATCH_THRESHOLD
}
