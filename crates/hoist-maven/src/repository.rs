//! Remote Maven repositories: base URL, credentials, entry URLs.

use std::collections::BTreeMap;
use std::path::Path;

use hoist_core::config::CredentialEntry;
use hoist_core::destination::{Destination, DestinationKind};
use hoist_util::errors::HoistError;

use crate::metadata::METADATA_FILE;

/// A remote repository to upload into, with optional credentials.
#[derive(Debug, Clone)]
pub struct RemoteRepository {
    pub id: String,
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl RemoteRepository {
    pub fn new(id: impl Into<String>, url: &str) -> Self {
        Self {
            id: id.into(),
            url: url.trim_end_matches('/').to_string(),
            username: None,
            password: None,
        }
    }

    /// Build from a remote destination, picking credentials by repository id.
    pub fn from_destination(
        dest: &Destination,
        credentials: &BTreeMap<String, CredentialEntry>,
    ) -> Result<Self, HoistError> {
        let DestinationKind::Remote(url) = &dest.kind else {
            return Err(HoistError::Generic {
                message: format!("{dest} is not a remote repository URL"),
            });
        };
        let mut repo = Self::new(&dest.id, url);
        if let Some(creds) = credentials.get(&dest.id) {
            repo.username = creds.username.clone();
            repo.password = creds.password.clone();
        }
        Ok(repo)
    }

    /// URL of a repository-relative entry path.
    pub fn entry_url(&self, rel: &Path) -> String {
        let segments: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        format!("{}/{}", self.url, segments.join("/"))
    }

    /// URL of the artifact-level `maven-metadata.xml`.
    pub fn metadata_url(&self, group: &str, artifact: &str) -> String {
        format!(
            "{}/{}/{artifact}/{METADATA_FILE}",
            self.url,
            group.replace('.', "/")
        )
    }

    /// Whether this repository has authentication configured.
    pub fn has_auth(&self) -> bool {
        self.username.is_some() || self.password.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn entry_url_joins_segments() {
        let repo = RemoteRepository::new("r", "https://repo.example.com/maven/");
        let url = repo.entry_url(&PathBuf::from("com/acme/core/1.0/core-1.0.jar"));
        assert_eq!(url, "https://repo.example.com/maven/com/acme/core/1.0/core-1.0.jar");
    }

    #[test]
    fn metadata_url_format() {
        let repo = RemoteRepository::new("r", "https://repo.example.com/maven");
        assert_eq!(
            repo.metadata_url("com.acme", "core"),
            "https://repo.example.com/maven/com/acme/core/maven-metadata.xml"
        );
    }

    #[test]
    fn credentials_picked_by_id() {
        let mut creds = BTreeMap::new();
        creds.insert(
            "releases".to_string(),
            CredentialEntry {
                username: Some("user".into()),
                password: Some("pass".into()),
            },
        );
        let dest = Destination::new("releases", "https://repo.example.com/maven");
        let repo = RemoteRepository::from_destination(&dest, &creds).unwrap();
        assert!(repo.has_auth());

        let other = Destination::new("snapshots", "https://repo.example.com/snapshots");
        assert!(!RemoteRepository::from_destination(&other, &creds).unwrap().has_auth());
    }

    #[test]
    fn directory_destination_rejected() {
        let dest = Destination::new("local", "file:///tmp/repo");
        assert!(RemoteRepository::from_destination(&dest, &BTreeMap::new()).is_err());
    }
}
