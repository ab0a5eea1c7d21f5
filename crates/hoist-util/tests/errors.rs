use hoist_util::errors::HoistError;

#[test]
fn test_io_error_display() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
    let err = HoistError::from(io_err);
    assert!(err.to_string().contains("I/O error"), "got: {err}");
}

#[test]
fn test_manifest_error_display() {
    let err = HoistError::Manifest {
        message: "bad syntax".to_string(),
    };
    assert_eq!(err.to_string(), "Manifest error: bad syntax");
}

#[test]
fn test_missing_pom_names_artifact() {
    let err = HoistError::MissingPom {
        artifact_id: "maven-deploy-test".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "The POM for project maven-deploy-test could not be attached"
    );
}

#[test]
fn test_no_artifact_file_display() {
    let err = HoistError::NoArtifactFile {
        artifact_id: "core".to_string(),
    };
    let msg = err.to_string();
    assert!(msg.contains("core"));
    assert!(msg.contains("did not assign a file"));
}

#[test]
fn test_incomplete_project_display() {
    let err = HoistError::IncompleteProject {
        artifact_id: "core".to_string(),
    };
    assert!(err.to_string().ends_with("Change packaging to 'pom'."));
}

#[test]
fn test_staging_error_carries_path() {
    let err = HoistError::staging(
        "/tmp/stage/a.jar",
        std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
    );
    let msg = err.to_string();
    assert!(msg.contains("/tmp/stage/a.jar"), "got: {msg}");
    assert!(msg.contains("denied"));
}

#[test]
fn test_registry_push_display() {
    let err = HoistError::RegistryPush {
        reference: "ghcr.io/acme/libs:latest".to_string(),
        message: "401 Unauthorized".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Failed to push to registry ghcr.io/acme/libs:latest: 401 Unauthorized"
    );
}

#[test]
fn test_generic_error_display() {
    let err = HoistError::Generic {
        message: "something broke".to_string(),
    };
    assert_eq!(err.to_string(), "something broke");
}

#[test]
fn test_report_downcasts_back() {
    let report: miette::Report = HoistError::Offline.into();
    assert!(matches!(
        report.downcast_ref::<HoistError>(),
        Some(HoistError::Offline)
    ));
}
