//! Handler for `hoist push`.

use std::path::Path;
use std::time::Duration;

use miette::Result;

use hoist_oci::target::OciTarget;
use hoist_ops::ops_push::{self, PushOptions};
use hoist_ops::retry::RetryPolicy;

use crate::cli::RegistryFlags;

pub fn exec(
    dir: &Path,
    image_repo: &str,
    image_tag: &str,
    registry: &RegistryFlags,
    attempts: u32,
    timeout_secs: u64,
) -> Result<()> {
    let target = OciTarget::new(image_repo, Some(image_tag));
    let options = PushOptions {
        username: registry.registry_username.clone(),
        password: registry.registry_password.clone(),
        insecure: registry.insecure_tls_no_verify,
    };

    let rt = super::runtime()?;
    rt.block_on(async {
        let retry = RetryPolicy::new(attempts, Duration::from_secs(timeout_secs.max(1)))
            .with_cancellation(super::ctrl_c_token());
        ops_push::push(dir, &target, &options, &retry).await
    })?;
    Ok(())
}
