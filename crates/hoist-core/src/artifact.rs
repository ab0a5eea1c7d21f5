//! Maven coordinates and the artifact records that get staged.

use std::fmt;
use std::path::{Path, PathBuf};

/// `group:artifact:version` identity of a build unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinates {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl Coordinates {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

/// One file to publish.
///
/// Created from a build unit, consumed once by the layout writer and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRecord {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub classifier: Option<String>,
    pub extension: String,
    pub file: Option<PathBuf>,
    /// Descriptor files that must be staged without checksum sidecars.
    pub no_checksum: bool,
}

impl ArtifactRecord {
    /// A record for `coords` with no backing file yet.
    pub fn new(coords: &Coordinates, classifier: Option<&str>, extension: &str) -> Self {
        Self {
            group_id: coords.group_id.clone(),
            artifact_id: coords.artifact_id.clone(),
            version: coords.version.clone(),
            classifier: classifier.filter(|c| !c.is_empty()).map(str::to_string),
            extension: extension.to_string(),
            file: None,
            no_checksum: false,
        }
    }

    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn without_checksums(mut self) -> Self {
        self.no_checksum = true;
        self
    }

    /// Whether the record is backed by an existing regular file.
    pub fn has_file(&self) -> bool {
        hoist_util::fs::is_regular_file(self.file.as_deref())
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// Compare identity only (coordinates, classifier, extension), never the file.
    pub fn same_id(&self, other: &ArtifactRecord) -> bool {
        self.group_id == other.group_id
            && self.artifact_id == other.artifact_id
            && self.version == other.version
            && self.classifier == other.classifier
            && self.extension == other.extension
    }

    /// `group:artifact:extension[:classifier]:version`
    pub fn id(&self) -> String {
        match &self.classifier {
            Some(c) => format!(
                "{}:{}:{}:{c}:{}",
                self.group_id, self.artifact_id, self.extension, self.version
            ),
            None => format!(
                "{}:{}:{}:{}",
                self.group_id, self.artifact_id, self.extension, self.version
            ),
        }
    }
}

impl fmt::Display for ArtifactRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}

/// Default extension and classifier for a packaging type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagingDefaults {
    pub extension: String,
    pub classifier: Option<String>,
}

/// Look up how a packaging type maps onto the primary artifact's file.
pub fn packaging_defaults(packaging: &str) -> PackagingDefaults {
    let (extension, classifier) = match packaging {
        "pom" | "bom" => ("pom", None),
        "jar" | "maven-plugin" | "ejb" | "bundle" => ("jar", None),
        "test-jar" => ("jar", Some("tests")),
        "java-source" => ("jar", Some("sources")),
        "javadoc" => ("jar", Some("javadoc")),
        other => (other, None),
    };
    PackagingDefaults {
        extension: extension.to_string(),
        classifier: classifier.map(str::to_string),
    }
}
