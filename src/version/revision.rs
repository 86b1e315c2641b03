use std::cmp::Ordering;

use semver::Version;

/// Parse a version string into a semver::Version, normalizing partial versions.
///
/// Handles partial versions like "1" or "1.2" by padding with zeros, and
/// strips a leading 'v'.
///
/// Examples:
/// - "1" -> Version(1, 0, 0)
/// - "1.2" -> Version(1, 2, 0)
/// - "v1.2.3" -> Version(1, 2, 3)
pub fn parse_version(version: &str) -> Option<Version> {
    let version = version.strip_prefix('v').unwrap_or(version);
    let parts: Vec<&str> = version.split('.').collect();
    let normalized = match parts.len() {
        1 => format!("{}.0.0", parts[0]),
        2 => format!("{}.{}.0", parts[0], parts[1]),
        _ => version.to_string(),
    };
    Version::parse(&normalized).ok()
}

/// Qualifiers with a conventional ordering; anything else sorts as text
/// between `rc` and `final`.
const SPECIAL_QUALIFIERS: &[(&str, i32)] = &[("dev", 0), ("alpha", 1), ("beta", 2), ("rc", 3), ("final", 5)];

fn qualifier_rank(part: &str) -> Option<i32> {
    SPECIAL_QUALIFIERS
        .iter()
        .find(|(name, _)| part.eq_ignore_ascii_case(name))
        .map(|(_, rank)| *rank)
}

#[derive(Debug, PartialEq, Eq)]
enum Part<'a> {
    Number(u64),
    Text(&'a str),
}

/// Split on separators and at digit/letter transitions: "1.0rc2" -> [1, 0, rc, 2]
fn split_parts(revision: &str) -> Vec<Part<'_>> {
    let mut parts = Vec::new();
    for chunk in revision.split(['.', '-', '_', '+']) {
        let mut start = 0;
        let bytes = chunk.as_bytes();
        for i in 1..=bytes.len() {
            let boundary = i == bytes.len()
                || bytes[i].is_ascii_digit() != bytes[i - 1].is_ascii_digit();
            if boundary {
                let piece = &chunk[start..i];
                parts.push(match piece.parse::<u64>() {
                    Ok(n) => Part::Number(n),
                    Err(_) => Part::Text(piece),
                });
                start = i;
            }
        }
    }
    parts
}

fn compare_parts(a: &Part<'_>, b: &Part<'_>) -> Ordering {
    match (a, b) {
        (Part::Number(x), Part::Number(y)) => x.cmp(y),
        (Part::Number(_), Part::Text(_)) => Ordering::Greater,
        (Part::Text(_), Part::Number(_)) => Ordering::Less,
        (Part::Text(x), Part::Text(y)) => match (qualifier_rank(x), qualifier_rank(y)) {
            (Some(rx), Some(ry)) => rx.cmp(&ry),
            (Some(rx), None) => rx.cmp(&4),
            (None, Some(ry)) => 4.cmp(&ry),
            (None, None) => x.cmp(y),
        },
    }
}

/// Order two revision strings, oldest first
///
/// Well-formed semantic versions compare by semver rules. Other revisions
/// compare part by part: numbers numerically, numbers above text, and
/// `dev < alpha < beta < rc < final` for qualifiers. When one revision is a
/// prefix of the other, a trailing number makes it newer ("1.0.1" > "1.0")
/// and a trailing qualifier makes it older ("1.0-rc1" < "1.0").
pub fn compare_revisions(a: &str, b: &str) -> Ordering {
    if let (Some(va), Some(vb)) = (parse_version(a), parse_version(b)) {
        let ordering = va.cmp(&vb);
        if ordering != Ordering::Equal || a == b {
            return ordering;
        }
    }

    let pa = split_parts(a);
    let pb = split_parts(b);
    for (x, y) in pa.iter().zip(pb.iter()) {
        let ordering = compare_parts(x, y);
        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    match pa.len().cmp(&pb.len()) {
        Ordering::Equal => Ordering::Equal,
        Ordering::Greater => match pa[pb.len()] {
            Part::Number(_) => Ordering::Greater,
            Part::Text(_) => Ordering::Less,
        },
        Ordering::Less => match pb[pa.len()] {
            Part::Number(_) => Ordering::Less,
            Part::Text(_) => Ordering::Greater,
        },
    }
}

/// Find the newest revision from a list
pub fn find_latest(revisions: &[String]) -> Option<String> {
    revisions
        .iter()
        .max_by(|a, b| compare_revisions(a, b))
        .cloned()
}

/// Sort revisions newest first
pub fn sort_newest_first(revisions: &mut [String]) {
    revisions.sort_by(|a, b| compare_revisions(b, a));
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.0", "1.1", Ordering::Less)]
    #[case("1.10", "1.9", Ordering::Greater)]
    #[case("1.0.1", "1.0", Ordering::Greater)]
    #[case("1.0-rc1", "1.0", Ordering::Less)]
    #[case("1.0-dev", "1.0-rc1", Ordering::Less)]
    #[case("1.0-beta", "1.0-rc", Ordering::Less)]
    #[case("1.0-final", "1.0-rc", Ordering::Greater)]
    #[case("2.0.0-alpha", "2.0.0", Ordering::Less)]
    #[case("v1.2.3", "1.2.4", Ordering::Less)]
    #[case("1.2.3.4", "1.2.3.10", Ordering::Less)]
    #[case("1.1", "1.1", Ordering::Equal)]
    #[case("1.0a", "1.0", Ordering::Less)]
    fn compare_revisions_orders_as_expected(
        #[case] a: &str,
        #[case] b: &str,
        #[case] expected: Ordering,
    ) {
        assert_eq!(compare_revisions(a, b), expected);
        assert_eq!(compare_revisions(b, a), expected.reverse());
    }

    #[rstest]
    #[case(vec![], None)]
    #[case(vec!["1.0", "1.1", "1.0.5"], Some("1.1"))]
    #[case(vec!["1.9", "1.10", "1.2"], Some("1.10"))]
    #[case(vec!["2.0-rc1", "1.9"], Some("2.0-rc1"))]
    fn find_latest_returns_expected(#[case] revisions: Vec<&str>, #[case] expected: Option<&str>) {
        let revisions: Vec<String> = revisions.into_iter().map(|s| s.to_string()).collect();
        assert_eq!(find_latest(&revisions), expected.map(|s| s.to_string()));
    }

    #[test]
    fn sort_newest_first_orders_descending() {
        let mut revisions = vec!["1.0".to_string(), "2.0".to_string(), "1.5".to_string()];
        sort_newest_first(&mut revisions);
        assert_eq!(revisions, vec!["2.0", "1.5", "1.0"]);
    }

    #[rstest]
    #[case("1", Some(Version::new(1, 0, 0)))]
    #[case("1.2", Some(Version::new(1, 2, 0)))]
    #[case("v1.2.3", Some(Version::new(1, 2, 3)))]
    #[case("latest.integration", None)]
    fn parse_version_pads_partial_versions(#[case] input: &str, #[case] expected: Option<Version>) {
        assert_eq!(parse_version(input), expected);
    }
}
