//! Snapshot/release classification of version strings.

/// Suffix marking a moving development version.
pub const SNAPSHOT: &str = "SNAPSHOT";

/// Whether a version is a snapshot or a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionKind {
    Snapshot,
    Release,
}

impl VersionKind {
    /// Classify a version string.
    pub fn of(version: &str) -> Self {
        if is_snapshot(version) {
            Self::Snapshot
        } else {
            Self::Release
        }
    }
}

/// A version is a snapshot when it ends in `SNAPSHOT` (any case) or is a
/// deployed timestamped snapshot such as `1.0-20240615.143022-42`.
pub fn is_snapshot(version: &str) -> bool {
    let suffix = version
        .len()
        .checked_sub(SNAPSHOT.len())
        .and_then(|start| version.get(start..));
    suffix.is_some_and(|s| s.eq_ignore_ascii_case(SNAPSHOT)) || is_timestamped_snapshot(version)
}

/// Matches `<base>-yyyyMMdd.HHmmss-<buildNumber>`.
fn is_timestamped_snapshot(version: &str) -> bool {
    let Some((rest, build)) = version.rsplit_once('-') else {
        return false;
    };
    if !all_digits(build, None) {
        return false;
    }
    let Some((_, timestamp)) = rest.rsplit_once('-') else {
        return false;
    };
    match timestamp.split_once('.') {
        Some((date, time)) => all_digits(date, Some(8)) && all_digits(time, Some(6)),
        None => false,
    }
}

fn all_digits(s: &str, len: Option<usize>) -> bool {
    !s.is_empty() && len.map_or(true, |l| s.len() == l) && s.bytes().all(|b| b.is_ascii_digit())
}
