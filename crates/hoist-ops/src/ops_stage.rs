//! Operation: deploy a manifest into a local directory.

use std::path::Path;

use hoist_core::destination::Destination;
use hoist_core::manifest::Manifest;
use hoist_util::progress::status_info;

use crate::ops_deploy::{report, SettingsOverrides};
use crate::orchestrator::{DeployOptions, DeploySummary, Orchestrator};
use crate::publisher::LocalDirectoryPublisher;

/// Stage every unit of the manifest under `dir`, honouring the same skip and
/// deferral rules as `deploy`. Unit repositories and overrides are not
/// consulted; all artifacts land in `dir`.
pub async fn stage(
    manifest_path: &Path,
    dir: &Path,
    overrides: &SettingsOverrides,
) -> miette::Result<DeploySummary> {
    let mut manifest = Manifest::from_path(manifest_path)?;
    overrides.apply(&mut manifest);

    let mut options = DeployOptions::from_settings(&manifest.deploy)?;
    options.destination = Some(Destination::new(
        "deploy-local",
        format!("file:{}", dir.display()),
    ));
    let units = manifest.build_units()?;
    let publisher = LocalDirectoryPublisher::rooted(dir, manifest.deploy.checksum_algorithms());

    status_info("Staging", &format!("{} units into {}", units.len(), dir.display()));
    let summary = Orchestrator::new(options, Box::new(publisher))
        .run(&units)
        .await?;
    report(&summary);
    Ok(summary)
}
