//! Handler for `hoist verify`.

use std::path::Path;

use miette::Result;

use hoist_ops::ops_verify;
use hoist_util::errors::HoistError;

pub fn exec(dir: &Path) -> Result<()> {
    let report = ops_verify::verify(dir)?;
    if report.is_clean() {
        return Ok(());
    }
    Err(HoistError::Generic {
        message: format!(
            "{} of {} checksums in {} do not match",
            report.mismatches.len(),
            report.sidecars,
            dir.display()
        ),
    }
    .into())
}
