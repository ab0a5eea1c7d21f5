//! Command dispatch and handler modules.

mod deploy;
mod push;
mod stage;
mod verify;

use std::path::{Path, PathBuf};

use miette::Result;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

use hoist_core::MANIFEST_FILE;
use hoist_util::errors::HoistError;

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Deploy { manifest, settings } => {
            deploy::exec(manifest.path.as_deref(), &settings.to_overrides())
        }
        Command::Stage {
            dir,
            manifest,
            settings,
        } => stage::exec(&dir, manifest.path.as_deref(), &settings.to_overrides()),
        Command::Push {
            dir,
            image_repo,
            image_tag,
            registry,
            retry_failed_deployment_count,
            timeout_secs,
        } => push::exec(
            &dir,
            &image_repo,
            &image_tag,
            &registry,
            retry_failed_deployment_count,
            timeout_secs,
        ),
        Command::Verify { dir } => verify::exec(&dir),
    }
}

/// The explicit `--manifest`, else the nearest `Hoist.toml` upward from the
/// current directory.
fn locate_manifest(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(HoistError::Io)?;
    hoist_util::fs::find_ancestor_with(&cwd, MANIFEST_FILE)
        .map(|dir| dir.join(MANIFEST_FILE))
        .ok_or_else(|| {
            HoistError::Manifest {
                message: format!("No {MANIFEST_FILE} found in current directory or any parent"),
            }
            .into()
        })
}

fn runtime() -> Result<Runtime> {
    Runtime::new().map_err(|e| {
        HoistError::Generic {
            message: format!("Failed to start async runtime: {e}"),
        }
        .into()
    })
}

/// A token cancelled on Ctrl-C. Must be called inside the runtime.
fn ctrl_c_token() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling");
            trigger.cancel();
        }
    });
    token
}
