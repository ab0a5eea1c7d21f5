//! Uploading artifact records into a classic remote repository.

use indexmap::IndexMap;
use reqwest::Client;

use hoist_core::artifact::ArtifactRecord;
use hoist_core::config::ChecksumAlgorithm;
use hoist_util::errors::HoistError;

use crate::checksum;
use crate::layout;
use crate::metadata::{self, MavenMetadata};
use crate::repository::RemoteRepository;
use crate::upload;

/// Upload every record with its sidecars, then merge the remote
/// `maven-metadata.xml` of each touched artifact.
///
/// Returns the number of files uploaded.
pub async fn deploy_records(
    client: &Client,
    repo: &RemoteRepository,
    records: &[ArtifactRecord],
    algorithms: &[ChecksumAlgorithm],
) -> miette::Result<usize> {
    let mut uploaded = 0usize;
    let mut touched: IndexMap<(String, String), Vec<String>> = IndexMap::new();

    for record in records {
        let Some(file) = record.file() else {
            tracing::warn!("Skipping {record}: no file");
            continue;
        };
        let data = tokio::fs::read(file)
            .await
            .map_err(|e| HoistError::staging(file, e))?;
        let url = repo.entry_url(&layout::entry_path(record));

        tracing::info!("Uploading {record} to {}", repo.id);
        uploaded += upload_with_sidecars(client, repo, &url, data, algorithms, !record.no_checksum)
            .await?;

        let versions = touched
            .entry((record.group_id.clone(), record.artifact_id.clone()))
            .or_default();
        if !versions.contains(&record.version) {
            versions.push(record.version.clone());
        }
    }

    let timestamp = metadata::timestamp_now();
    for ((group, artifact), versions) in &touched {
        let url = repo.metadata_url(group, artifact);
        let mut meta = match upload::get_text(client, repo, &url).await? {
            Some(xml) => metadata::parse_metadata(&xml)?,
            None => MavenMetadata::new(group, artifact),
        };
        meta.merge(versions.iter().map(String::as_str), &timestamp);
        let xml = meta.to_xml()?;
        uploaded += upload_with_sidecars(client, repo, &url, xml.into_bytes(), algorithms, true)
            .await?;
    }

    Ok(uploaded)
}

async fn upload_with_sidecars(
    client: &Client,
    repo: &RemoteRepository,
    url: &str,
    data: Vec<u8>,
    algorithms: &[ChecksumAlgorithm],
    with_checksums: bool,
) -> miette::Result<usize> {
    let sums: Vec<(ChecksumAlgorithm, String)> = if with_checksums {
        algorithms
            .iter()
            .map(|&a| (a, checksum::digest_bytes(a, &data)))
            .collect()
    } else {
        Vec::new()
    };

    upload::put_bytes(client, repo, url, data).await?;
    for (algo, hex) in &sums {
        let sidecar_url = format!("{url}.{}", algo.extension());
        upload::put_bytes(client, repo, &sidecar_url, hex.clone().into_bytes()).await?;
    }
    Ok(1 + sums.len())
}
