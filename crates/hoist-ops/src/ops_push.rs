//! Operation: package an existing staging directory and push it.

use std::path::Path;

use hoist_oci::auth::Credentials;
use hoist_oci::push::{OciPusher, PushOutcome};
use hoist_oci::target::OciTarget;
use hoist_util::errors::HoistError;
use hoist_util::progress::{format_size, spinner, status};

use crate::publisher::push_timeout;
use crate::retry::RetryPolicy;

/// Registry options for a standalone push.
#[derive(Debug, Clone, Default)]
pub struct PushOptions {
    pub username: Option<String>,
    pub password: Option<String>,
    pub insecure: bool,
}

impl PushOptions {
    fn explicit(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => Some((u, p)),
            _ => None,
        }
    }
}

pub async fn push(
    dir: &Path,
    target: &OciTarget,
    options: &PushOptions,
    retry: &RetryPolicy,
) -> miette::Result<PushOutcome> {
    if !dir.is_dir() {
        return Err(HoistError::Generic {
            message: format!("Staging directory {} does not exist", dir.display()),
        }
        .into());
    }

    let credentials = Credentials::resolve(target.registry(), options.explicit());
    let pusher = OciPusher::new(credentials, options.insecure);

    tracing::debug!(
        "Pushing {} with up to {} attempts",
        dir.display(),
        retry.attempts()
    );
    let sp = spinner(&format!("Pushing {} to {target}...", dir.display()));
    let result = retry
        .run_with(&format!("Push to {target}"), push_timeout(target), || {
            pusher.push_directory(dir, target)
        })
        .await;
    sp.finish_and_clear();
    let outcome = result?;
    tracing::debug!("Manifest available at {}", outcome.manifest_url);

    status(
        "Pushed",
        &format!(
            "{target} ({} files, {}) at {}",
            outcome.files.len(),
            format_size(outcome.size),
            outcome.digest
        ),
    );
    Ok(outcome)
}
