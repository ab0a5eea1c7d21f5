//! CLI argument definitions for Hoist.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use hoist_core::config::PublisherKind;
use hoist_ops::ops_deploy::SettingsOverrides;

#[derive(Parser, Debug)]
#[command(
    name = "hoist",
    version,
    about = "Stage and deploy Maven artifacts to repositories and OCI registries",
    long_about = "Hoist lays build outputs out as a Maven repository with checksums and \
                  publishes them to a local directory, a remote repository, or an OCI \
                  registry as a single-layer artifact."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Deploy every unit of the manifest with the configured publisher
    Deploy {
        #[command(flatten)]
        manifest: ManifestArg,
        #[command(flatten)]
        settings: DeployFlags,
    },

    /// Deploy every unit into a local directory
    Stage {
        /// Target directory
        dir: PathBuf,
        #[command(flatten)]
        manifest: ManifestArg,
        #[command(flatten)]
        settings: DeployFlags,
    },

    /// Package an existing staging directory and push it to a registry
    Push {
        /// Staging directory to push
        dir: PathBuf,
        /// Image repository, e.g. ghcr.io/acme/libs
        #[arg(long)]
        image_repo: String,
        /// Image tag
        #[arg(long, default_value = "latest")]
        image_tag: String,
        #[command(flatten)]
        registry: RegistryFlags,
        /// Attempts before giving up (1-10)
        #[arg(long, default_value_t = 1)]
        retry_failed_deployment_count: u32,
        /// Per-attempt timeout in seconds
        #[arg(long, default_value_t = 300)]
        timeout_secs: u64,
    },

    /// Recompute and check every checksum sidecar in a directory
    Verify {
        /// Directory to verify
        dir: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct ManifestArg {
    /// Path to Hoist.toml (default: nearest one upward from the current directory)
    #[arg(short = 'm', long = "manifest")]
    pub path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct RegistryFlags {
    /// Registry username
    #[arg(long, env = "HOIST_REGISTRY_USERNAME")]
    pub registry_username: Option<String>,
    /// Registry password
    #[arg(long, env = "HOIST_REGISTRY_PASSWORD", hide_env_values = true)]
    pub registry_password: Option<String>,
    /// Skip TLS certificate verification
    #[arg(long)]
    pub insecure_tls_no_verify: bool,
}

/// Flags that override `[deploy]` and `[registry]` manifest values.
#[derive(Args, Debug, Clone, Default)]
pub struct DeployFlags {
    /// Skip deployment: true, releases or snapshots
    #[arg(long)]
    pub skip: Option<String>,
    /// Defer all uploads until the last unit has been processed
    #[arg(long)]
    pub deploy_at_end: bool,
    /// Deploy attachments of units that have no main artifact
    #[arg(long)]
    pub allow_incomplete_projects: bool,
    /// Destination for every unit, as id::url
    #[arg(long)]
    pub alt_deployment_repository: Option<String>,
    /// Destination for snapshot units, as id::url
    #[arg(long)]
    pub alt_snapshot_deployment_repository: Option<String>,
    /// Destination for release units, as id::url
    #[arg(long)]
    pub alt_release_deployment_repository: Option<String>,
    /// Image repository for the OCI publisher
    #[arg(long)]
    pub image_repo: Option<String>,
    /// Image tag for the OCI publisher
    #[arg(long)]
    pub image_tag: Option<String>,
    #[command(flatten)]
    pub registry: RegistryFlags,
    /// Attempts per upload or push (1-10)
    #[arg(long)]
    pub retry_failed_deployment_count: Option<i64>,
    /// Publisher: oci, local or remote
    #[arg(long)]
    pub publisher: Option<PublisherKind>,
    /// Refuse to touch the network
    #[arg(long)]
    pub offline: bool,
}

impl DeployFlags {
    pub fn to_overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            skip: self.skip.clone(),
            deploy_at_end: self.deploy_at_end,
            allow_incomplete_projects: self.allow_incomplete_projects,
            alt_deployment_repository: self.alt_deployment_repository.clone(),
            alt_snapshot_deployment_repository: self.alt_snapshot_deployment_repository.clone(),
            alt_release_deployment_repository: self.alt_release_deployment_repository.clone(),
            image_repo: self.image_repo.clone(),
            image_tag: self.image_tag.clone(),
            registry_username: self.registry.registry_username.clone(),
            registry_password: self.registry.registry_password.clone(),
            insecure_tls_no_verify: self.registry.insecure_tls_no_verify,
            retry_failed_deployment_count: self.retry_failed_deployment_count,
            publisher: self.publisher,
            offline: self.offline,
        }
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn deploy_flags_map_to_overrides() {
        let cli = Cli::try_parse_from([
            "hoist",
            "deploy",
            "--skip",
            "releases",
            "--publisher",
            "remote",
            "--retry-failed-deployment-count",
            "4",
            "--alt-deployment-repository",
            "id::http://repo",
        ])
        .unwrap();
        let Command::Deploy { settings, .. } = cli.command else {
            panic!("expected deploy");
        };
        let o = settings.to_overrides();
        assert_eq!(o.skip.as_deref(), Some("releases"));
        assert_eq!(o.publisher, Some(PublisherKind::Remote));
        assert_eq!(o.retry_failed_deployment_count, Some(4));
        assert_eq!(o.alt_deployment_repository.as_deref(), Some("id::http://repo"));
    }

    #[test]
    fn unknown_publisher_is_rejected() {
        assert!(Cli::try_parse_from(["hoist", "deploy", "--publisher", "ftp"]).is_err());
    }
}
