use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use hoist_util::errors::HoistError;

use crate::artifact::{ArtifactRecord, Coordinates};
use crate::config::{CredentialEntry, DeploySettings, RegistrySettings, SkipPolicy};
use crate::destination::Destination;
use crate::unit::BuildUnit;

/// The parsed representation of a `Hoist.toml` file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub deploy: DeploySettings,

    #[serde(default)]
    pub registry: RegistrySettings,

    #[serde(default)]
    pub credentials: BTreeMap<String, CredentialEntry>,

    #[serde(default, rename = "unit")]
    pub units: Vec<UnitEntry>,

    /// Directory relative file paths are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// One `[[unit]]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UnitEntry {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    #[serde(default = "default_packaging")]
    pub packaging: String,
    #[serde(default)]
    pub pom: Option<PathBuf>,
    #[serde(default)]
    pub file: Option<PathBuf>,
    #[serde(default)]
    pub distribution_repository: Option<String>,
    #[serde(default)]
    pub skip: Option<SkipPolicy>,
    #[serde(default = "default_participates")]
    pub participates: bool,
    #[serde(default)]
    pub attached: Vec<AttachedEntry>,
}

/// One `[[unit.attached]]` table. Missing coordinates default to the unit's.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AttachedEntry {
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub artifact_id: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub classifier: Option<String>,
    #[serde(default = "default_extension")]
    pub extension: String,
    #[serde(default)]
    pub file: Option<PathBuf>,
    #[serde(default)]
    pub no_checksum: bool,
}

fn default_packaging() -> String {
    "jar".to_string()
}

fn default_extension() -> String {
    "jar".to_string()
}

fn default_participates() -> bool {
    true
}

impl Manifest {
    /// Load and parse a `Hoist.toml` file from the given path.
    pub fn from_path(path: &Path) -> miette::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| HoistError::Manifest {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;

        let mut manifest = Self::from_str(&content)?;
        manifest.base_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();
        Ok(manifest)
    }

    /// Parse a `Hoist.toml` from a string. Paths stay as written.
    pub fn from_str(content: &str) -> miette::Result<Self> {
        toml::from_str(content).map_err(|e| {
            HoistError::Manifest {
                message: format!("Failed to parse Hoist.toml: {e}"),
            }
            .into()
        })
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Turn the `[[unit]]` tables into build units, in declaration order.
    pub fn build_units(&self) -> Result<Vec<BuildUnit>, HoistError> {
        self.units.iter().map(|entry| self.build_unit(entry)).collect()
    }

    fn build_unit(&self, entry: &UnitEntry) -> Result<BuildUnit, HoistError> {
        let coords = Coordinates::new(&entry.group_id, &entry.artifact_id, &entry.version);
        check_coordinates(&coords)?;
        let mut unit = BuildUnit::new(coords.clone(), &entry.packaging);
        unit.pom_file = entry.pom.as_deref().map(|p| self.resolve(p));
        unit.file = entry.file.as_deref().map(|p| self.resolve(p));
        unit.skip = entry.skip;
        unit.participates = entry.participates;

        if let Some(raw) = &entry.distribution_repository {
            unit.distribution_repository = Some(Destination::parse(raw)?);
        }

        for att in &entry.attached {
            let owner = Coordinates::new(
                att.group_id.as_deref().unwrap_or(&coords.group_id),
                att.artifact_id.as_deref().unwrap_or(&coords.artifact_id),
                att.version.as_deref().unwrap_or(&coords.version),
            );
            check_coordinates(&owner)?;
            if let Some(classifier) = att.classifier.as_deref().filter(|c| !c.is_empty()) {
                check_segment(&owner, "classifier", classifier)?;
            }
            check_segment(&owner, "extension", &att.extension)?;
            let mut record = ArtifactRecord::new(&owner, att.classifier.as_deref(), &att.extension);
            if let Some(f) = &att.file {
                record = record.with_file(self.resolve(f));
            }
            if att.no_checksum {
                record = record.without_checksums();
            }
            unit = unit.attach_record(record);
        }

        Ok(unit)
    }
}

/// Coordinates become path segments in the repository layout, so none of
/// them may be empty or step outside their directory.
fn check_coordinates(coords: &Coordinates) -> Result<(), HoistError> {
    for segment in coords.group_id.split('.') {
        check_segment(coords, "group-id", segment)?;
    }
    check_segment(coords, "artifact-id", &coords.artifact_id)?;
    check_segment(coords, "version", &coords.version)
}

fn check_segment(coords: &Coordinates, field: &str, value: &str) -> Result<(), HoistError> {
    let unsafe_segment = value.is_empty()
        || value == "."
        || value.contains("..")
        || value.contains(|c| c == '/' || c == '\\');
    if unsafe_segment {
        return Err(HoistError::Manifest {
            message: format!(
                "Invalid {field} in unit {coords}: {value:?} is not a valid path segment"
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_manifest_uses_defaults() {
        let m = Manifest::from_str("").unwrap();
        assert!(m.units.is_empty());
        assert_eq!(m.deploy.timeout_secs, 300);
        assert_eq!(m.registry.image_tag, "latest");
    }

    #[test]
    fn attachment_inherits_unit_coordinates() {
        let m = Manifest::from_str(
            r#"
[[unit]]
group-id = "g"
artifact-id = "a"
version = "1.0"

[[unit.attached]]
classifier = "sources"
file = "a-sources.jar"
"#,
        )
        .unwrap();
        let units = m.build_units().unwrap();
        let att = &units[0].attached[0];
        assert_eq!(att.artifact_id, "a");
        assert_eq!(att.extension, "jar");
        assert_eq!(att.file(), Some(Path::new("a-sources.jar")));
    }

    #[test]
    fn coordinates_must_stay_inside_the_repository() {
        let unit = |group: &str, artifact: &str, version: &str| {
            format!(
                "[[unit]]\ngroup-id = {group:?}\nartifact-id = {artifact:?}\nversion = {version:?}\n"
            )
        };
        for (group, artifact, version) in [
            ("a./tmp/outside", "evil", "1.0"),
            ("com..acme", "lib", "1.0"),
            ("com.acme", "../lib", "1.0"),
            ("com.acme", "lib", "1.0/../.."),
            ("com.acme", "", "1.0"),
            ("com.acme", "lib", "..\\x"),
        ] {
            let m = Manifest::from_str(&unit(group, artifact, version)).unwrap();
            let err = m.build_units().unwrap_err();
            assert!(
                matches!(err, HoistError::Manifest { .. }),
                "{group}:{artifact}:{version} was accepted"
            );
        }

        let m = Manifest::from_str(&unit("com.acme", "lib", "1.0-SNAPSHOT")).unwrap();
        assert!(m.build_units().is_ok());
    }

    #[test]
    fn attachment_classifier_must_be_a_plain_segment() {
        let m = Manifest::from_str(
            r#"
[[unit]]
group-id = "g"
artifact-id = "a"
version = "1.0"

[[unit.attached]]
classifier = "../../escape"
file = "a.jar"
"#,
        )
        .unwrap();
        assert!(matches!(
            m.build_units().unwrap_err(),
            HoistError::Manifest { .. }
        ));
    }
}
