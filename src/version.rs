//! Version ordering.
//!
//! Version identifiers come in two families: bare years (`2023`, `2024`) and
//! dotted numeric sequences (`1.9.0`, `1.10.0`). Comparison never fails; a
//! segment that does not start with a digit counts as `0`.

use std::cmp::Ordering;

/// Compare two version identifiers.
///
/// - identical strings are equal
/// - two 4-digit years compare as integers
/// - anything else is split on `.` and compared segment by segment, missing
///   segments counting as `0` (so `1.2` == `1.2.0`)
///
/// ```
/// use feature_matrix::version::compare_versions;
/// use std::cmp::Ordering;
///
/// assert_eq!(compare_versions("1.9.0", "1.10.0"), Ordering::Less);
/// assert_eq!(compare_versions("2024", "2023"), Ordering::Greater);
/// ```
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }

    if is_year(a) && is_year(b) {
        return segment_value(a).cmp(&segment_value(b));
    }

    let left: Vec<u64> = a.split('.').map(segment_value).collect();
    let right: Vec<u64> = b.split('.').map(segment_value).collect();
    let len = left.len().max(right.len());

    for i in 0..len {
        let l = left.get(i).copied().unwrap_or(0);
        let r = right.get(i).copied().unwrap_or(0);
        match l.cmp(&r) {
            Ordering::Equal => continue,
            other => return other,
        }
    }

    Ordering::Equal
}

/// Sort version identifiers ascending. Stable: versions that compare equal
/// keep their incoming order.
pub fn sort_versions<S: AsRef<str>>(versions: &mut [S]) {
    versions.sort_by(|a, b| compare_versions(a.as_ref(), b.as_ref()));
}

/// Greatest version by [`compare_versions`]; the first one wins on ties.
pub fn max_version<'a, I>(versions: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    versions.into_iter().fold(None, |best, candidate| match best {
        Some(current) if compare_versions(candidate, current) != Ordering::Greater => {
            Some(current)
        }
        _ => Some(candidate),
    })
}

fn is_year(token: &str) -> bool {
    token.len() == 4 && token.bytes().all(|b| b.is_ascii_digit())
}

/// Leading-digit integer value of a segment; `0` if there are none.
fn segment_value(segment: &str) -> u64 {
    let digits: &str = {
        let trimmed = segment.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        &trimmed[..end]
    };
    digits.parse().unwrap_or(0)
}
