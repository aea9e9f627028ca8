//! Attribute normalization and q-gram extraction.

use crate::QGramSet;

/// Trim, lowercase and drop every whitespace character.
///
/// ```
/// use qgram::normalize_value;
///
/// assert_eq!(normalize_value("  Mary Ann "), "maryann");
/// ```
pub fn normalize_value(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// Set of every contiguous `q`-character window of the normalized value.
///
/// Windows are taken over characters, so multi-byte input is never split.
/// Values shorter than `q` produce an empty set.
pub fn extract_qgrams(value: &str, q: usize) -> QGramSet {
    let chars: Vec<char> = normalize_value(value).chars().collect();
    if q == 0 || chars.len() < q {
        return QGramSet::new();
    }
    chars.windows(q).map(|w| w.iter().collect()).collect()
}

/// Union of the q-grams of every sensitive attribute value of one record.
///
/// Returns `None` when any value is blank or when the union is empty; such
/// records cannot be encoded and are dropped by the caller.
pub fn record_qgrams<S: AsRef<str>>(values: &[S], q: usize) -> Option<QGramSet> {
    let mut qs = QGramSet::new();
    for value in values {
        let value = value.as_ref();
        if value.trim().is_empty() {
            return None;
        }
        qs.extend(extract_qgrams(value, q));
    }
    if qs.is_empty() {
        None
    } else {
        Some(qs)
    }
}
