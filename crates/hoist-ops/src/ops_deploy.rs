//! Operation: deploy every unit of a manifest with the configured publisher.

use std::path::Path;

use tokio_util::sync::CancellationToken;

use hoist_core::config::{PublisherKind, SkipPolicy};
use hoist_core::manifest::Manifest;
use hoist_maven::staging::StagingRepository;
use hoist_oci::target::OciTarget;
use hoist_util::progress::{status, status_info};

use crate::orchestrator::{DeployOptions, DeploySummary, Orchestrator, UnitState};
use crate::publisher::{
    LocalDirectoryPublisher, OciRegistryPublisher, Publisher, RemoteRepositoryPublisher,
};
use crate::retry::RetryPolicy;

/// Command-line values layered over the manifest. `None` / `false` keep the
/// manifest's value.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub skip: Option<String>,
    pub deploy_at_end: bool,
    pub allow_incomplete_projects: bool,
    pub alt_deployment_repository: Option<String>,
    pub alt_snapshot_deployment_repository: Option<String>,
    pub alt_release_deployment_repository: Option<String>,
    pub image_repo: Option<String>,
    pub image_tag: Option<String>,
    pub registry_username: Option<String>,
    pub registry_password: Option<String>,
    pub insecure_tls_no_verify: bool,
    pub retry_failed_deployment_count: Option<i64>,
    pub publisher: Option<PublisherKind>,
    pub offline: bool,
}

impl SettingsOverrides {
    pub fn apply(&self, manifest: &mut Manifest) {
        let deploy = &mut manifest.deploy;
        if let Some(skip) = &self.skip {
            deploy.skip = SkipPolicy::parse(skip);
        }
        deploy.deploy_at_end |= self.deploy_at_end;
        deploy.allow_incomplete_projects |= self.allow_incomplete_projects;
        deploy.offline |= self.offline;
        if let Some(v) = &self.alt_deployment_repository {
            deploy.alt_deployment_repository = Some(v.clone());
        }
        if let Some(v) = &self.alt_snapshot_deployment_repository {
            deploy.alt_snapshot_deployment_repository = Some(v.clone());
        }
        if let Some(v) = &self.alt_release_deployment_repository {
            deploy.alt_release_deployment_repository = Some(v.clone());
        }
        if let Some(n) = self.retry_failed_deployment_count {
            deploy.retry_failed_deployment_count = n;
        }
        if let Some(kind) = self.publisher {
            deploy.publisher = kind;
        }

        let registry = &mut manifest.registry;
        if let Some(v) = &self.image_repo {
            registry.image_repo = Some(v.clone());
        }
        if let Some(v) = &self.image_tag {
            registry.image_tag = v.clone();
        }
        if let Some(v) = &self.registry_username {
            registry.username = Some(v.clone());
        }
        if let Some(v) = &self.registry_password {
            registry.password = Some(v.clone());
        }
        registry.insecure_tls_no_verify |= self.insecure_tls_no_verify;
    }
}

/// Load the manifest at `manifest_path`, apply `overrides` and deploy.
pub async fn deploy(
    manifest_path: &Path,
    overrides: &SettingsOverrides,
    cancel: CancellationToken,
) -> miette::Result<DeploySummary> {
    let mut manifest = Manifest::from_path(manifest_path)?;
    overrides.apply(&mut manifest);

    let options = DeployOptions::from_settings(&manifest.deploy)?;
    let units = manifest.build_units()?;
    let publisher = build_publisher(&manifest, cancel)?;

    status_info(
        "Deploying",
        &format!("{} units via {} publisher", units.len(), publisher.name()),
    );
    let summary = Orchestrator::new(options, publisher).run(&units).await?;
    report(&summary);
    Ok(summary)
}

/// Pick the publisher named by `deploy.publisher`.
pub fn build_publisher(
    manifest: &Manifest,
    cancel: CancellationToken,
) -> miette::Result<Box<dyn Publisher>> {
    let deploy = &manifest.deploy;
    let algorithms = deploy.checksum_algorithms();
    let retry = RetryPolicy::from_settings(deploy).with_cancellation(cancel);

    let publisher: Box<dyn Publisher> = match deploy.publisher {
        PublisherKind::Local => Box::new(LocalDirectoryPublisher::new(algorithms)),
        PublisherKind::Remote => Box::new(RemoteRepositoryPublisher::new(
            manifest.credentials.clone(),
            algorithms,
            retry,
        )?),
        PublisherKind::Oci => {
            let registry = &manifest.registry;
            let root = manifest.base_dir.join(&deploy.staging_dir);
            let staging = StagingRepository::open(root, algorithms)?;
            let target = registry
                .image_repo
                .as_deref()
                .map(|repo| OciTarget::new(repo, Some(&registry.image_tag)));

            let mut publisher = OciRegistryPublisher::new(staging, target, retry)
                .reuse_staging(deploy.reuse_staging)
                .insecure(registry.insecure_tls_no_verify);
            if let Some((user, pass)) = registry.explicit_credentials() {
                publisher = publisher.with_credentials(user, pass);
            }
            Box::new(publisher)
        }
    };
    Ok(publisher)
}

pub(crate) fn report(summary: &DeploySummary) {
    for outcome in &summary.outcomes {
        match &outcome.digest {
            Some(digest) => status(
                "Pushed",
                &format!("{} ({} files, {digest})", outcome.location, outcome.files),
            ),
            None => status(
                "Deployed",
                &format!("{} files to {}", outcome.files, outcome.location),
            ),
        }
    }
    let skipped = summary.count(UnitState::Skipped);
    if skipped > 0 {
        status_info("Skipped", &format!("{skipped} units"));
    }
    status(
        "Finished",
        &format!(
            "{} units deployed, {} files",
            summary.count(UnitState::Deployed),
            summary.files()
        ),
    );
}
