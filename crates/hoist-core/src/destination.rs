//! Typed deploy destinations and the `id::url` override syntax.
//!
//! Override strings are a compatibility format only: they are parsed into a
//! [`Destination`] as soon as they enter the program, and everything past
//! that point works with the typed value.

use std::fmt;
use std::path::PathBuf;

use hoist_util::errors::HoistError;

use crate::artifact::Coordinates;
use crate::version::VersionKind;

/// Where a destination URL points.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DestinationKind {
    /// `file:` URL, a directory laid out as a Maven repository.
    Directory(PathBuf),
    /// Any other URL, a classic remote Maven repository.
    Remote(String),
    /// `oci://` URL, an OCI registry reference (`registry/repository[:tag]`).
    Registry(String),
}

/// A named push target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Destination {
    pub id: String,
    pub url: String,
    pub kind: DestinationKind,
}

impl Destination {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        let url = url.into();
        let kind = kind_of(&url);
        Self {
            id: id.into(),
            url,
            kind,
        }
    }

    /// Parse `id::url`, or the legacy `id::default::url`.
    ///
    /// Any other legacy layout is rejected with a message naming the
    /// corrected `id::url` form.
    pub fn parse(raw: &str) -> Result<Self, HoistError> {
        if let Some((id, rest)) = split_separator(raw) {
            if let Some((layout, url)) = split_separator(rest) {
                let (id, layout, url) = (id.trim(), layout.trim(), url.trim());
                if layout == "default" {
                    tracing::warn!(
                        "Using legacy syntax for alternative repository. Use \"{id}::{url}\" instead."
                    );
                    return Ok(Self::new(id, url));
                }
                return Err(HoistError::InvalidDestinationSyntax {
                    message: format!(
                        "Invalid legacy syntax and layout for alternative repository: \"{raw}\". \
                         Use \"{id}::{url}\" instead, and only default layout is supported."
                    ),
                });
            }
            return Ok(Self::new(id.trim(), rest.trim()));
        }
        Err(HoistError::InvalidDestinationSyntax {
            message: format!("Invalid syntax for alternative repository: \"{raw}\". Use \"id::url\"."),
        })
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.id, self.url)
    }
}

fn kind_of(url: &str) -> DestinationKind {
    if let Some(reference) = url.strip_prefix("oci://") {
        DestinationKind::Registry(reference.to_string())
    } else if let Some(path) = url.strip_prefix("file://") {
        DestinationKind::Directory(PathBuf::from(path))
    } else if let Some(path) = url.strip_prefix("file:") {
        DestinationKind::Directory(PathBuf::from(path))
    } else {
        DestinationKind::Remote(url.trim_end_matches('/').to_string())
    }
}

/// Split at the first `::` that has at least one character on each side.
fn split_separator(s: &str) -> Option<(&str, &str)> {
    s.match_indices("::")
        .map(|(idx, _)| idx)
        .find(|&idx| idx > 0 && idx + 2 < s.len())
        .map(|idx| (&s[..idx], &s[idx + 2..]))
}

/// Parsed per-call destination overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DestinationOverrides {
    pub snapshot: Option<Destination>,
    pub release: Option<Destination>,
    pub generic: Option<Destination>,
}

impl DestinationOverrides {
    /// Parse the raw override strings. Fails before any I/O on bad syntax.
    pub fn parse(
        snapshot: Option<&str>,
        release: Option<&str>,
        generic: Option<&str>,
    ) -> Result<Self, HoistError> {
        Ok(Self {
            snapshot: snapshot.map(Destination::parse).transpose()?,
            release: release.map(Destination::parse).transpose()?,
            generic: generic.map(Destination::parse).transpose()?,
        })
    }

    /// Pick the destination for a unit.
    ///
    /// A version-specific override wins over the generic one, which wins over
    /// the unit's declared default.
    pub fn resolve(
        &self,
        coordinates: &Coordinates,
        default: Option<&Destination>,
    ) -> Result<Destination, HoistError> {
        let chosen = match VersionKind::of(&coordinates.version) {
            VersionKind::Snapshot if self.snapshot.is_some() => self.snapshot.as_ref(),
            VersionKind::Release if self.release.is_some() => self.release.as_ref(),
            _ => self.generic.as_ref(),
        };

        if let Some(dest) = chosen {
            tracing::info!("Using alternate deployment repository {dest}");
            return Ok(dest.clone());
        }

        default.cloned().ok_or_else(|| HoistError::MissingDestination {
            coordinates: coordinates.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_url() {
        let d = Destination::parse("releases::https://repo.example.com/maven/").unwrap();
        assert_eq!(d.id, "releases");
        assert_eq!(d.url, "https://repo.example.com/maven/");
        assert_eq!(
            d.kind,
            DestinationKind::Remote("https://repo.example.com/maven".to_string())
        );
    }

    #[test]
    fn parse_trims_parts() {
        let d = Destination::parse(" local :: file:///tmp/repo ").unwrap();
        assert_eq!(d.id, "local");
        assert_eq!(d.kind, DestinationKind::Directory(PathBuf::from("/tmp/repo")));
    }

    #[test]
    fn parse_oci_url() {
        let d = Destination::parse("ghcr::oci://ghcr.io/acme/libs:1.0").unwrap();
        assert_eq!(
            d.kind,
            DestinationKind::Registry("ghcr.io/acme/libs:1.0".to_string())
        );
    }

    #[test]
    fn scm_url_is_not_legacy() {
        let d = Destination::parse("alt::scm:svn:http://localhost").unwrap();
        assert_eq!(d.url, "scm:svn:http://localhost");
    }

    #[test]
    fn legacy_default_layout_accepted() {
        let d = Destination::parse("altDeploymentRepository::default::http://localhost").unwrap();
        assert_eq!(d, Destination::new("altDeploymentRepository", "http://localhost"));
    }

    #[test]
    fn legacy_layout_rejected_with_corrected_syntax() {
        let raw = "altDeploymentRepository::legacy::http://localhost";
        let err = Destination::parse(raw).unwrap_err();
        assert!(matches!(err, HoistError::InvalidDestinationSyntax { .. }));
        assert_eq!(
            err.to_string(),
            format!(
                "Invalid legacy syntax and layout for alternative repository: \"{raw}\". \
                 Use \"altDeploymentRepository::http://localhost\" instead, and only default layout is supported."
            )
        );
    }

    #[test]
    fn too_many_separators_rejected() {
        let raw = "altDeploymentRepository::hey::wow::foo::http://localhost";
        let err = Destination::parse(raw).unwrap_err();
        assert!(err
            .to_string()
            .contains("Use \"altDeploymentRepository::wow::foo::http://localhost\" instead"));
    }

    #[test]
    fn missing_separator_rejected() {
        let err = Destination::parse("http://localhost").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid syntax for alternative repository: \"http://localhost\". Use \"id::url\"."
        );
        assert!(Destination::parse("::http://localhost").is_err());
        assert!(Destination::parse("id::").is_err());
    }

    #[test]
    fn snapshot_override_wins_over_generic() {
        let overrides = DestinationOverrides::parse(
            Some("snap::http://snapshots"),
            None,
            Some("any::http://generic"),
        )
        .unwrap();
        let coords = Coordinates::new("g", "a", "1.0-SNAPSHOT");
        let dest = overrides.resolve(&coords, None).unwrap();
        assert_eq!(dest.id, "snap");
    }

    #[test]
    fn release_override_ignored_for_snapshot() {
        let overrides =
            DestinationOverrides::parse(None, Some("rel::http://releases"), None).unwrap();
        let coords = Coordinates::new("g", "a", "1.0-SNAPSHOT");
        let default = Destination::new("dist", "http://dist");
        let dest = overrides.resolve(&coords, Some(&default)).unwrap();
        assert_eq!(dest, default);
    }

    #[test]
    fn release_override_for_release() {
        let overrides = DestinationOverrides::parse(
            Some("snap::http://snapshots"),
            Some("rel::http://releases"),
            Some("any::http://generic"),
        )
        .unwrap();
        let dest = overrides
            .resolve(&Coordinates::new("g", "a", "1.0"), None)
            .unwrap();
        assert_eq!(dest.id, "rel");
    }

    #[test]
    fn missing_destination() {
        let overrides = DestinationOverrides::default();
        let err = overrides
            .resolve(&Coordinates::new("g", "a", "1.0"), None)
            .unwrap_err();
        assert!(matches!(err, HoistError::MissingDestination { .. }));
        assert!(err.to_string().contains("g:a:1.0"));
    }
}
