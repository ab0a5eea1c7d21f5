use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all hoist operations.
#[derive(Debug, Error, Diagnostic)]
pub enum HoistError {
    /// I/O operation failed outside of staging.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or malformed manifest (e.g. Hoist.toml).
    #[error("Manifest error: {message}")]
    #[diagnostic(help("Check your Hoist.toml for syntax errors"))]
    Manifest { message: String },

    /// The unit's POM record has no backing file.
    #[error("The POM for project {artifact_id} could not be attached")]
    MissingPom { artifact_id: String },

    /// No primary file and no attachments.
    #[error(
        "The packaging plugin for project {artifact_id} did not assign a file to the build artifact"
    )]
    NoArtifactFile { artifact_id: String },

    /// Primary file missing but attachments exist.
    #[error(
        "The packaging plugin for project {artifact_id} did not assign a main file to the project \
         but it has attachments. Change packaging to 'pom'."
    )]
    #[diagnostic(help("Set `allow-incomplete-projects = true` to deploy the attachments anyway"))]
    IncompleteProject { artifact_id: String },

    /// Filesystem failure while writing the staging repository.
    #[error("Failed to stage {}: {source}", path.display())]
    StagingIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Authentication, network or TLS failure while pushing to a registry.
    #[error("Failed to push to registry {reference}: {message}")]
    RegistryPush { reference: String, message: String },

    /// Neither an override nor a declared default destination exists.
    #[error(
        "Deployment failed for {coordinates}: repository element was not specified in the POM inside \
         distributionManagement element or in -DaltDeploymentRepository=id::url parameter"
    )]
    MissingDestination { coordinates: String },

    /// A destination override string could not be parsed.
    #[error("{message}")]
    #[diagnostic(help("Destination overrides use the form `id::url`"))]
    InvalidDestinationSyntax { message: String },

    /// Network request or upload failed.
    #[error("Network error: {message}")]
    Network { message: String },

    /// A network publisher was selected while offline.
    #[error("Cannot deploy artifacts when offline")]
    Offline,

    /// The operation was cancelled before it completed.
    #[error("Deploy cancelled: {message}")]
    Cancelled { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

impl HoistError {
    /// Wrap an I/O error with the staging path it happened on.
    pub fn staging(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::StagingIo {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias for `miette::Result<T>`.
pub type HoistResult<T> = miette::Result<T>;
