use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use hoist_util::errors::HoistError;

use crate::destination::DestinationOverrides;
use crate::version;

/// Lowest and highest accepted `retry-failed-deployment-count`.
pub const MIN_RETRIES: u32 = 1;
pub const MAX_RETRIES: u32 = 10;

/// When a unit's deployment is skipped.
///
/// Parsed leniently: `true` skips always, `releases` / `snapshots` skip the
/// matching version class, anything else means "never".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "SkipValue")]
pub enum SkipPolicy {
    #[default]
    Never,
    Always,
    Releases,
    Snapshots,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SkipValue {
    Flag(bool),
    Text(String),
}

impl From<SkipValue> for SkipPolicy {
    fn from(value: SkipValue) -> Self {
        match value {
            SkipValue::Flag(true) => Self::Always,
            SkipValue::Flag(false) => Self::Never,
            SkipValue::Text(s) => Self::parse(&s),
        }
    }
}

impl SkipPolicy {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            v if v.eq_ignore_ascii_case("true") => Self::Always,
            "releases" => Self::Releases,
            "snapshots" => Self::Snapshots,
            _ => Self::Never,
        }
    }

    /// Whether a unit with `version` is skipped under this policy.
    pub fn skips(self, version: &str) -> bool {
        match self {
            Self::Never => false,
            Self::Always => true,
            Self::Releases => !version::is_snapshot(version),
            Self::Snapshots => version::is_snapshot(version),
        }
    }
}

/// Which publisher the orchestrator is wired with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublisherKind {
    /// Stage locally, then push the staging tree to an OCI registry.
    #[default]
    Oci,
    /// Write straight into a directory laid out as a repository.
    Local,
    /// Upload to a classic remote repository over HTTP.
    Remote,
}

impl PublisherKind {
    /// Whether publishing needs network access.
    pub fn needs_network(self) -> bool {
        !matches!(self, Self::Local)
    }
}

impl FromStr for PublisherKind {
    type Err = HoistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "oci" => Ok(Self::Oci),
            "local" => Ok(Self::Local),
            "remote" => Ok(Self::Remote),
            other => Err(HoistError::Manifest {
                message: format!("Unknown publisher '{other}': expected oci, local or remote"),
            }),
        }
    }
}

/// Checksum sidecar algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Sha512,
}

impl ChecksumAlgorithm {
    /// Sidecar file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        }
    }
}

/// Deploy settings from the `[deploy]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DeploySettings {
    #[serde(default)]
    pub skip: SkipPolicy,
    #[serde(default)]
    pub deploy_at_end: bool,
    #[serde(default)]
    pub allow_incomplete_projects: bool,
    #[serde(default)]
    pub alt_deployment_repository: Option<String>,
    #[serde(default)]
    pub alt_snapshot_deployment_repository: Option<String>,
    #[serde(default)]
    pub alt_release_deployment_repository: Option<String>,
    #[serde(default = "default_retry_count")]
    pub retry_failed_deployment_count: i64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub publisher: PublisherKind,
    #[serde(default = "default_staging_dir")]
    pub staging_dir: PathBuf,
    #[serde(default)]
    pub reuse_staging: bool,
    #[serde(default = "default_checksums")]
    pub checksums: Vec<ChecksumAlgorithm>,
    #[serde(default)]
    pub offline: bool,
}

impl Default for DeploySettings {
    fn default() -> Self {
        Self {
            skip: SkipPolicy::Never,
            deploy_at_end: false,
            allow_incomplete_projects: false,
            alt_deployment_repository: None,
            alt_snapshot_deployment_repository: None,
            alt_release_deployment_repository: None,
            retry_failed_deployment_count: default_retry_count(),
            timeout_secs: default_timeout_secs(),
            publisher: PublisherKind::default(),
            staging_dir: default_staging_dir(),
            reuse_staging: false,
            checksums: default_checksums(),
            offline: false,
        }
    }
}

fn default_retry_count() -> i64 {
    1
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_staging_dir() -> PathBuf {
    PathBuf::from("target/oci-artifacts")
}

fn default_checksums() -> Vec<ChecksumAlgorithm> {
    vec![ChecksumAlgorithm::Md5, ChecksumAlgorithm::Sha1]
}

impl DeploySettings {
    /// Attempt count, pulled into `1..=10`.
    pub fn retry_count(&self) -> u32 {
        let clamped = self
            .retry_failed_deployment_count
            .clamp(i64::from(MIN_RETRIES), i64::from(MAX_RETRIES));
        if clamped != self.retry_failed_deployment_count {
            tracing::warn!(
                "retry-failed-deployment-count {} is outside {MIN_RETRIES}..={MAX_RETRIES}, using {clamped}",
                self.retry_failed_deployment_count
            );
        }
        clamped as u32
    }

    /// Timeout applied to each network publish step.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Configured algorithms, sorted and deduplicated, always including SHA-1.
    pub fn checksum_algorithms(&self) -> Vec<ChecksumAlgorithm> {
        let mut algos = self.checksums.clone();
        algos.push(ChecksumAlgorithm::Sha1);
        algos.sort();
        algos.dedup();
        algos
    }

    /// Parse the three override strings into typed destinations.
    pub fn overrides(&self) -> Result<DestinationOverrides, HoistError> {
        DestinationOverrides::parse(
            self.alt_snapshot_deployment_repository.as_deref(),
            self.alt_release_deployment_repository.as_deref(),
            self.alt_deployment_repository.as_deref(),
        )
    }
}

/// OCI registry settings from the `[registry]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RegistrySettings {
    #[serde(default)]
    pub image_repo: Option<String>,
    #[serde(default = "default_image_tag")]
    pub image_tag: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub insecure_tls_no_verify: bool,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            image_repo: None,
            image_tag: default_image_tag(),
            username: None,
            password: None,
            insecure_tls_no_verify: false,
        }
    }
}

fn default_image_tag() -> String {
    "latest".to_string()
}

impl RegistrySettings {
    /// Username and password, only when both are non-empty.
    pub fn explicit_credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => Some((u, p)),
            _ => None,
        }
    }
}

/// Credentials for a remote repository, keyed by repository id.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialEntry {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}
