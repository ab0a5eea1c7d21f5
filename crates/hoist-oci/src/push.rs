//! Pushing a bundled directory to a registry.

use std::path::{Path, PathBuf};

use oci_distribution::client::{ClientConfig, ClientProtocol, Config, ImageLayer, PushResponse};
use oci_distribution::Client;

use hoist_util::errors::HoistError;

use crate::auth::Credentials;
use crate::bundle::{self, DirectoryBundle};
use crate::target::OciTarget;

/// Result of a successful push.
#[derive(Debug, Clone)]
pub struct PushOutcome {
    pub target: OciTarget,
    /// Manifest digest reported by the registry (`sha256:...`).
    pub digest: String,
    pub manifest_url: String,
    pub files: Vec<PathBuf>,
    /// Compressed layer size in bytes.
    pub size: u64,
}

/// Pushes staging directories to an OCI registry.
pub struct OciPusher {
    client: Client,
    credentials: Credentials,
}

impl OciPusher {
    /// `insecure` disables TLS certificate verification.
    pub fn new(credentials: Credentials, insecure: bool) -> Self {
        if insecure {
            tracing::warn!("TLS certificate verification is disabled for registry pushes");
        }
        let config = ClientConfig {
            protocol: ClientProtocol::Https,
            accept_invalid_certificates: insecure,
            ..Default::default()
        };
        Self {
            client: Client::new(config),
            credentials,
        }
    }

    /// Pack `root` and push it as a single-layer artifact to `target`.
    pub async fn push_directory(
        &self,
        root: &Path,
        target: &OciTarget,
    ) -> miette::Result<PushOutcome> {
        let packed = bundle::bundle_directory(root)?;
        self.push_bundle(packed, target).await
    }

    /// Push an already packed bundle.
    pub async fn push_bundle(
        &self,
        packed: DirectoryBundle,
        target: &OciTarget,
    ) -> miette::Result<PushOutcome> {
        let reference = target.to_reference()?;
        let push_err = |message: String| HoistError::RegistryPush {
            reference: target.to_string(),
            message,
        };

        let size = packed.data.len() as u64;
        let annotations = packed.annotations();
        let layers = vec![ImageLayer::new(
            packed.data,
            bundle::LAYER_MEDIA_TYPE.to_string(),
            Some(annotations),
        )];
        let config = Config::new(
            bundle::EMPTY_CONFIG.to_vec(),
            bundle::EMPTY_CONFIG_MEDIA_TYPE.to_string(),
            None,
        );

        tracing::info!(
            "Pushing {} files to {target} ({:?} credentials)",
            packed.files.len(),
            self.credentials.source
        );

        let auth = self.credentials.to_oci_auth();
        let response: PushResponse = self
            .client
            .push(&reference, &layers, config, &auth, None)
            .await
            .map_err(|e| push_err(e.to_string()))?;

        let (_manifest, digest) = self
            .client
            .pull_manifest(&reference, &auth)
            .await
            .map_err(|e| push_err(format!("pushed, but reading back the manifest failed: {e}")))?;

        tracing::info!("Pushed {target} at {digest}");

        Ok(PushOutcome {
            target: target.clone(),
            digest,
            manifest_url: response.manifest_url,
            files: packed.files,
            size,
        })
    }
}
