//! Handler for `hoist deploy`.

use std::path::Path;

use miette::Result;

use hoist_ops::ops_deploy::{self, SettingsOverrides};

pub fn exec(manifest: Option<&Path>, overrides: &SettingsOverrides) -> Result<()> {
    let manifest_path = super::locate_manifest(manifest)?;
    let rt = super::runtime()?;
    rt.block_on(async {
        let cancel = super::ctrl_c_token();
        ops_deploy::deploy(&manifest_path, overrides, cancel).await
    })?;
    Ok(())
}
