//! Publishers: where a push request's artifacts actually go.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use indexmap::IndexMap;

use hoist_core::artifact::ArtifactRecord;
use hoist_core::config::{ChecksumAlgorithm, CredentialEntry};
use hoist_core::destination::{Destination, DestinationKind};
use hoist_maven::repository::RemoteRepository;
use hoist_maven::staging::StagingRepository;
use hoist_oci::auth::Credentials;
use hoist_oci::push::OciPusher;
use hoist_oci::target::OciTarget;
use hoist_util::errors::HoistError;
use hoist_util::progress::format_size;

use crate::retry::RetryPolicy;

/// Ordered artifacts bound for one destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushRequest {
    pub destination: Destination,
    pub records: Vec<ArtifactRecord>,
}

impl PushRequest {
    pub fn new(destination: Destination) -> Self {
        Self {
            destination,
            records: Vec::new(),
        }
    }

    pub fn with_records(destination: Destination, records: Vec<ArtifactRecord>) -> Self {
        Self {
            destination,
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// What a publisher did with one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOutcome {
    /// Human-readable location: a directory, URL or image reference.
    pub location: String,
    pub records: usize,
    /// Files written or uploaded, sidecars and metadata included.
    pub files: usize,
    /// Manifest digest, for registry pushes.
    pub digest: Option<String>,
}

/// Capability injected into the orchestrator to materialize push requests.
#[async_trait]
pub trait Publisher: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether publishing talks to the network (and is refused offline).
    fn needs_network(&self) -> bool;

    /// Deferred requests with equal keys are merged into one request.
    fn batch_key(&self, destination: &Destination) -> miette::Result<String> {
        Ok(destination.to_string())
    }

    async fn publish(&self, request: &PushRequest) -> miette::Result<PublishOutcome>;
}

/// Writes requests into a directory laid out as a repository.
///
/// With a fixed root every request lands there; otherwise the request's
/// `file:` destination is used.
#[derive(Debug, Clone)]
pub struct LocalDirectoryPublisher {
    root: Option<PathBuf>,
    algorithms: Vec<ChecksumAlgorithm>,
}

impl LocalDirectoryPublisher {
    pub fn new(algorithms: Vec<ChecksumAlgorithm>) -> Self {
        Self {
            root: None,
            algorithms,
        }
    }

    pub fn rooted(root: impl Into<PathBuf>, algorithms: Vec<ChecksumAlgorithm>) -> Self {
        Self {
            root: Some(root.into()),
            algorithms,
        }
    }

    fn root_for(&self, dest: &Destination) -> Result<PathBuf, HoistError> {
        if let Some(root) = &self.root {
            return Ok(root.clone());
        }
        match &dest.kind {
            DestinationKind::Directory(path) => Ok(path.clone()),
            _ => Err(HoistError::Generic {
                message: format!("{dest} is not a file: destination; the local publisher needs a directory"),
            }),
        }
    }
}

#[async_trait]
impl Publisher for LocalDirectoryPublisher {
    fn name(&self) -> &'static str {
        "local"
    }

    fn needs_network(&self) -> bool {
        false
    }

    async fn publish(&self, request: &PushRequest) -> miette::Result<PublishOutcome> {
        let root = self.root_for(&request.destination)?;
        let staging = StagingRepository::open(&root, self.algorithms.clone())?;
        let report = staging.stage(&request.records)?;
        let location = std::path::absolute(&root)
            .unwrap_or(root)
            .display()
            .to_string();
        tracing::info!("Successfully deployed to local directory: {location}");
        Ok(PublishOutcome {
            location,
            records: report.records,
            files: report.files.len() + report.metadata.len(),
            digest: None,
        })
    }
}

/// Uploads requests to classic remote repositories over HTTP.
pub struct RemoteRepositoryPublisher {
    client: reqwest::Client,
    credentials: BTreeMap<String, CredentialEntry>,
    algorithms: Vec<ChecksumAlgorithm>,
    retry: RetryPolicy,
}

impl RemoteRepositoryPublisher {
    pub fn new(
        credentials: BTreeMap<String, CredentialEntry>,
        algorithms: Vec<ChecksumAlgorithm>,
        retry: RetryPolicy,
    ) -> miette::Result<Self> {
        let client = hoist_maven::upload::build_client(retry.timeout())?;
        Ok(Self {
            client,
            credentials,
            algorithms,
            retry,
        })
    }
}

#[async_trait]
impl Publisher for RemoteRepositoryPublisher {
    fn name(&self) -> &'static str {
        "remote"
    }

    fn needs_network(&self) -> bool {
        true
    }

    async fn publish(&self, request: &PushRequest) -> miette::Result<PublishOutcome> {
        let dest = &request.destination;
        match &dest.kind {
            DestinationKind::Directory(_) => {
                return LocalDirectoryPublisher::new(self.algorithms.clone())
                    .publish(request)
                    .await;
            }
            DestinationKind::Registry(_) => {
                return Err(HoistError::Generic {
                    message: format!(
                        "{dest} is an OCI registry; set `publisher = \"oci\"` to push there"
                    ),
                }
                .into());
            }
            DestinationKind::Remote(_) => {}
        }

        let repo = RemoteRepository::from_destination(dest, &self.credentials)?;
        if !repo.has_auth() {
            tracing::debug!("No credentials configured for repository '{}'", repo.id);
        }
        let label = format!("Deploy to {}", repo.url);
        let files = self
            .retry
            .run(&label, || {
                hoist_maven::publish::deploy_records(
                    &self.client,
                    &repo,
                    &request.records,
                    &self.algorithms,
                )
            })
            .await?;

        Ok(PublishOutcome {
            location: repo.url.clone(),
            records: request.len(),
            files,
            digest: None,
        })
    }
}

/// Builds the error for a registry push attempt that timed out.
pub(crate) fn push_timeout(target: &OciTarget) -> impl Fn(String) -> HoistError + '_ {
    move |message| HoistError::RegistryPush {
        reference: target.to_string(),
        message,
    }
}

/// Stages requests locally and pushes the staging tree as an OCI artifact.
///
/// Every push to a target carries all artifacts sent to that target during
/// this run, so a later push never drops modules from the tag.
pub struct OciRegistryPublisher {
    staging: StagingRepository,
    reuse_staging: bool,
    default_target: Option<OciTarget>,
    explicit: Option<(String, String)>,
    insecure: bool,
    retry: RetryPolicy,
    pushed: Mutex<IndexMap<String, Vec<ArtifactRecord>>>,
}

impl OciRegistryPublisher {
    pub fn new(
        staging: StagingRepository,
        default_target: Option<OciTarget>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            staging,
            reuse_staging: false,
            default_target,
            explicit: None,
            insecure: false,
            retry,
            pushed: Mutex::new(IndexMap::new()),
        }
    }

    /// Keep earlier staging content between requests.
    pub fn reuse_staging(mut self, reuse: bool) -> Self {
        self.reuse_staging = reuse;
        self
    }

    /// Credentials tried before the environment and the Docker config.
    pub fn with_credentials(mut self, username: &str, password: &str) -> Self {
        self.explicit = Some((username.to_string(), password.to_string()));
        self
    }

    /// Disable TLS certificate verification.
    pub fn insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    /// An `oci://` destination names its own image; anything else goes to the
    /// configured image repository.
    pub fn target_for(&self, dest: &Destination) -> Result<OciTarget, HoistError> {
        let default_tag = self.default_target.as_ref().map(|t| t.tag.as_str());
        match (&dest.kind, &self.default_target) {
            (DestinationKind::Registry(reference), _) => {
                Ok(OciTarget::parse(reference, default_tag))
            }
            (_, Some(target)) => Ok(target.clone()),
            (_, None) => Err(HoistError::Generic {
                message: format!(
                    "No OCI image repository for {dest}: set `image-repo` under [registry] \
                     or pass --image-repo"
                ),
            }),
        }
    }

    /// Add `records` to what this run has sent to `target` and return the lot.
    fn accumulate(&self, target: &OciTarget, records: &[ArtifactRecord]) -> Vec<ArtifactRecord> {
        let mut pushed = self.pushed.lock().unwrap_or_else(|e| e.into_inner());
        let sent = pushed.entry(target.to_string()).or_default();
        for record in records {
            if !sent.contains(record) {
                sent.push(record.clone());
            }
        }
        sent.clone()
    }
}

#[async_trait]
impl Publisher for OciRegistryPublisher {
    fn name(&self) -> &'static str {
        "oci"
    }

    fn needs_network(&self) -> bool {
        true
    }

    fn batch_key(&self, destination: &Destination) -> miette::Result<String> {
        Ok(self.target_for(destination)?.to_string())
    }

    async fn publish(&self, request: &PushRequest) -> miette::Result<PublishOutcome> {
        let target = self.target_for(&request.destination)?;
        let records = self.accumulate(&target, &request.records);
        if records.len() > request.len() {
            tracing::debug!(
                "{target} already carries artifacts from this run; pushing {} in total",
                records.len()
            );
        }

        if !self.reuse_staging {
            self.staging.clear()?;
        }
        let report = self.staging.stage(&records)?;
        tracing::info!(
            "Staged {} artifacts ({}) in {}",
            report.records,
            format_size(self.staging.size()),
            self.staging.root().display()
        );

        let explicit = self
            .explicit
            .as_ref()
            .map(|(u, p)| (u.as_str(), p.as_str()));
        let credentials = Credentials::resolve(target.registry(), explicit);
        let pusher = OciPusher::new(credentials, self.insecure);

        let label = format!("Push to {target}");
        let root = self.staging.root();
        let outcome = self
            .retry
            .run_with(&label, push_timeout(&target), || {
                pusher.push_directory(root, &target)
            })
            .await?;

        Ok(PublishOutcome {
            location: outcome.target.to_string(),
            records: report.records,
            files: outcome.files.len(),
            digest: Some(outcome.digest),
        })
    }
}
