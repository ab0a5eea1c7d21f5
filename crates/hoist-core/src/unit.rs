//! Build units: one module's POM, primary artifact and attachments.

use std::path::PathBuf;

use crate::artifact::{packaging_defaults, ArtifactRecord, Coordinates};
use crate::config::SkipPolicy;
use crate::destination::Destination;

/// One module's set of deployable artifacts.
#[derive(Debug, Clone)]
pub struct BuildUnit {
    pub coordinates: Coordinates,
    pub packaging: String,
    pub pom_file: Option<PathBuf>,
    /// Primary artifact file, assigned once packaging completed.
    pub file: Option<PathBuf>,
    pub attached: Vec<ArtifactRecord>,
    /// Declared default destination (the module's distribution repository).
    pub distribution_repository: Option<Destination>,
    /// Unit-level skip policy, overriding the global one when set.
    pub skip: Option<SkipPolicy>,
    /// Whether the unit takes part in deploying at all.
    pub participates: bool,
}

impl BuildUnit {
    pub fn new(coordinates: Coordinates, packaging: impl Into<String>) -> Self {
        Self {
            coordinates,
            packaging: packaging.into(),
            pom_file: None,
            file: None,
            attached: Vec::new(),
            distribution_repository: None,
            skip: None,
            participates: true,
        }
    }

    pub fn with_pom(mut self, pom: impl Into<PathBuf>) -> Self {
        self.pom_file = Some(pom.into());
        self
    }

    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_distribution(mut self, destination: Destination) -> Self {
        self.distribution_repository = Some(destination);
        self
    }

    /// Attach a classified artifact with the unit's own coordinates.
    pub fn attach(
        mut self,
        classifier: Option<&str>,
        extension: &str,
        file: impl Into<PathBuf>,
    ) -> Self {
        let record = ArtifactRecord::new(&self.coordinates, classifier, extension).with_file(file);
        self.attached.push(record);
        self
    }

    /// Attach an arbitrary record, e.g. one with a different artifactId.
    pub fn attach_record(mut self, record: ArtifactRecord) -> Self {
        self.attached.push(record);
        self
    }

    pub fn artifact_id(&self) -> &str {
        &self.coordinates.artifact_id
    }

    /// The POM record; always exists, may lack a file.
    pub fn pom_record(&self) -> ArtifactRecord {
        let record = ArtifactRecord::new(&self.coordinates, None, "pom");
        match &self.pom_file {
            Some(f) => record.with_file(f),
            None => record,
        }
    }

    /// The primary record derived from the packaging type; may lack a file.
    pub fn primary_record(&self) -> ArtifactRecord {
        let defaults = packaging_defaults(&self.packaging);
        let record = ArtifactRecord::new(
            &self.coordinates,
            defaults.classifier.as_deref(),
            &defaults.extension,
        );
        match &self.file {
            Some(f) => record.with_file(f),
            None => record,
        }
    }
}
