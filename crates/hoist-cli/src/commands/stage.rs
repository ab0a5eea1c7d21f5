//! Handler for `hoist stage`.

use std::path::Path;

use miette::Result;

use hoist_ops::ops_deploy::SettingsOverrides;
use hoist_ops::ops_stage;

pub fn exec(dir: &Path, manifest: Option<&Path>, overrides: &SettingsOverrides) -> Result<()> {
    let manifest_path = super::locate_manifest(manifest)?;
    let rt = super::runtime()?;
    rt.block_on(ops_stage::stage(&manifest_path, dir, overrides))?;
    Ok(())
}
