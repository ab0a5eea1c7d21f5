//! Where an OCI push goes: `registry/repository:tag`.

use std::fmt;

use oci_distribution::Reference;

use hoist_util::errors::HoistError;

/// Tag used when none is given.
pub const DEFAULT_TAG: &str = "latest";

/// An image repository plus tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OciTarget {
    /// `registry/namespace/name`, no tag.
    pub repository: String,
    pub tag: String,
}

impl OciTarget {
    pub fn new(repository: impl Into<String>, tag: Option<&str>) -> Self {
        Self {
            repository: repository.into(),
            tag: tag
                .filter(|t| !t.is_empty())
                .unwrap_or(DEFAULT_TAG)
                .to_string(),
        }
    }

    /// Split `registry/repo[:tag]`, using `default_tag` when no tag is present.
    ///
    /// A colon before the last `/` belongs to a registry port, not a tag.
    pub fn parse(reference: &str, default_tag: Option<&str>) -> Self {
        let reference = reference.trim().trim_end_matches('/');
        let name_start = reference.rfind('/').map_or(0, |i| i + 1);
        match reference[name_start..].rfind(':') {
            Some(i) => {
                let split = name_start + i;
                Self::new(&reference[..split], Some(&reference[split + 1..]))
            }
            None => Self::new(reference, default_tag),
        }
    }

    /// Registry host of the repository (`ghcr.io`, `localhost:5000`).
    pub fn registry(&self) -> &str {
        self.repository
            .split_once('/')
            .map_or(self.repository.as_str(), |(host, _)| host)
    }

    pub fn to_reference(&self) -> Result<Reference, HoistError> {
        self.to_string()
            .parse::<Reference>()
            .map_err(|e| HoistError::RegistryPush {
                reference: self.to_string(),
                message: format!("Invalid OCI reference: {e}"),
            })
    }
}

impl fmt::Display for OciTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tag_is_latest() {
        let t = OciTarget::new("ghcr.io/acme/libs", None);
        assert_eq!(t.to_string(), "ghcr.io/acme/libs:latest");
        assert_eq!(OciTarget::new("r/x", Some("")).tag, "latest");
    }

    #[test]
    fn parse_with_tag() {
        let t = OciTarget::parse("ghcr.io/acme/libs:1.0", None);
        assert_eq!(t.repository, "ghcr.io/acme/libs");
        assert_eq!(t.tag, "1.0");
    }

    #[test]
    fn parse_port_is_not_tag() {
        let t = OciTarget::parse("localhost:5000/acme/libs", Some("nightly"));
        assert_eq!(t.repository, "localhost:5000/acme/libs");
        assert_eq!(t.tag, "nightly");
        assert_eq!(t.registry(), "localhost:5000");
    }

    #[test]
    fn reference_parses() {
        let t = OciTarget::new("ghcr.io/acme/libs", Some("1.0"));
        let r = t.to_reference().unwrap();
        assert_eq!(r.registry(), "ghcr.io");
        assert_eq!(r.repository(), "acme/libs");
        assert_eq!(r.tag(), Some("1.0"));
    }
}
