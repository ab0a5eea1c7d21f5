//! Turning a build unit into the ordered list of records to publish.

use hoist_core::artifact::ArtifactRecord;
use hoist_core::unit::BuildUnit;
use hoist_util::errors::HoistError;

/// Collect the POM, the primary artifact and the attachments of `unit`.
///
/// For `pom` packaging the POM and primary records share an identity and
/// collapse into one, preferring whichever carries a file. A primary
/// artifact without a file is tolerated only when the unit has attachments
/// and `allow_incomplete` is set.
pub fn collect_unit(
    unit: &BuildUnit,
    allow_incomplete: bool,
) -> Result<Vec<ArtifactRecord>, HoistError> {
    let mut pom = unit.pom_record();
    let mut primary = Some(unit.primary_record());

    if let Some(p) = primary.take_if(|p| p.same_id(&pom)) {
        if p.has_file() {
            pom = p;
        }
    }

    if !pom.has_file() {
        return Err(HoistError::MissingPom {
            artifact_id: unit.artifact_id().to_string(),
        });
    }

    let mut records = vec![pom];

    if let Some(p) = primary {
        if p.has_file() {
            records.push(p);
        } else if unit.attached.is_empty() {
            return Err(HoistError::NoArtifactFile {
                artifact_id: unit.artifact_id().to_string(),
            });
        } else if allow_incomplete {
            tracing::warn!(
                "The packaging plugin for project {} did not assign a main file to the project \
                 but it has attachments. Change packaging to 'pom'. \
                 Incomplete projects like this will fail in future versions!",
                unit.artifact_id()
            );
        } else {
            return Err(HoistError::IncompleteProject {
                artifact_id: unit.artifact_id().to_string(),
            });
        }
    }

    for attached in &unit.attached {
        if attached.has_file() {
            tracing::debug!("Attaching for deploy: {attached}");
            records.push(attached.clone());
        } else {
            tracing::warn!("Skipping artifact with no file: {attached}");
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoist_core::artifact::Coordinates;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &TempDir, name: &str) -> std::path::PathBuf {
        let p = dir.path().join(name);
        fs::write(&p, name).unwrap();
        p
    }

    #[test]
    fn pom_packaging_collapses_to_one_record() {
        let dir = TempDir::new().unwrap();
        let unit = BuildUnit::new(Coordinates::new("g", "parent", "1.0"), "pom")
            .with_pom(touch(&dir, "pom.xml"));
        let records = collect_unit(&unit, false).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].extension, "pom");
    }

    #[test]
    fn pom_packaging_prefers_primary_file() {
        let dir = TempDir::new().unwrap();
        let packaged = touch(&dir, "packaged.pom");
        let unit = BuildUnit::new(Coordinates::new("g", "bom", "1.0"), "bom")
            .with_pom(touch(&dir, "pom.xml"))
            .with_file(&packaged);
        let records = collect_unit(&unit, false).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].file(), Some(packaged.as_path()));
    }

    #[test]
    fn missing_pom_fails() {
        let unit = BuildUnit::new(Coordinates::new("g", "a", "1.0"), "jar");
        let err = collect_unit(&unit, false).unwrap_err();
        assert_eq!(err.to_string(), "The POM for project a could not be attached");
    }

    #[test]
    fn no_primary_no_attachments_fails() {
        let dir = TempDir::new().unwrap();
        let unit = BuildUnit::new(Coordinates::new("g", "a", "1.0"), "jar")
            .with_pom(touch(&dir, "pom.xml"));
        let err = collect_unit(&unit, false).unwrap_err();
        assert!(matches!(err, HoistError::NoArtifactFile { .. }));
        assert!(err.to_string().contains("did not assign a file"));
        assert!(err.to_string().contains(" a "));
    }

    #[test]
    fn incomplete_project_fails_unless_allowed() {
        let dir = TempDir::new().unwrap();
        let unit = BuildUnit::new(Coordinates::new("g", "a", "1.0"), "jar")
            .with_pom(touch(&dir, "pom.xml"))
            .attach(Some("sources"), "jar", touch(&dir, "a-sources.jar"));

        let err = collect_unit(&unit, false).unwrap_err();
        assert!(matches!(err, HoistError::IncompleteProject { .. }));

        let records = collect_unit(&unit, true).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].classifier.as_deref(), Some("sources"));
    }

    #[test]
    fn attachments_keep_order_and_skip_missing_files() {
        let dir = TempDir::new().unwrap();
        let unit = BuildUnit::new(Coordinates::new("g", "a", "1.0"), "jar")
            .with_pom(touch(&dir, "pom.xml"))
            .with_file(touch(&dir, "a.jar"))
            .attach(Some("sources"), "jar", touch(&dir, "a-sources.jar"))
            .attach(Some("javadoc"), "jar", dir.path().join("missing.jar"))
            .attach(Some("tests"), "jar", touch(&dir, "a-tests.jar"));

        let records = collect_unit(&unit, false).unwrap();
        let classifiers: Vec<_> = records.iter().map(|r| r.classifier.as_deref()).collect();
        assert_eq!(classifiers, vec![None, None, Some("sources"), Some("tests")]);
        assert_eq!(records[0].extension, "pom");
        assert_eq!(records[1].extension, "jar");
    }
}
