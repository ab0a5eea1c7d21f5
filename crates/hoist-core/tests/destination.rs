use hoist_core::artifact::Coordinates;
use hoist_core::config::DeploySettings;
use hoist_core::destination::{Destination, DestinationKind};
use std::path::PathBuf;

#[test]
fn test_overrides_parsed_from_settings() {
    let settings = DeploySettings {
        alt_deployment_repository: Some("any::file:///srv/repo".into()),
        alt_release_deployment_repository: Some("rel::oci://ghcr.io/acme/libs:1.0".into()),
        ..Default::default()
    };
    let overrides = settings.overrides().unwrap();

    let snap = overrides
        .resolve(&Coordinates::new("g", "a", "1.0-SNAPSHOT"), None)
        .unwrap();
    assert_eq!(snap.kind, DestinationKind::Directory(PathBuf::from("/srv/repo")));

    let rel = overrides
        .resolve(&Coordinates::new("g", "a", "1.0"), None)
        .unwrap();
    assert_eq!(
        rel.kind,
        DestinationKind::Registry("ghcr.io/acme/libs:1.0".into())
    );
}

#[test]
fn test_invalid_unused_override_still_fails() {
    let settings = DeploySettings {
        alt_snapshot_deployment_repository: Some("no-separator".into()),
        ..Default::default()
    };
    assert!(settings.overrides().is_err());
}

#[test]
fn test_destination_display_round_trips_id_and_url() {
    let d = Destination::new("central", "https://repo.example.com/maven2");
    assert_eq!(d.to_string(), "central::https://repo.example.com/maven2");
    assert_eq!(Destination::parse(&d.to_string()).unwrap(), d);
}

#[test]
fn test_file_url_without_authority() {
    let d = Destination::parse("local::file:/var/repo").unwrap();
    assert_eq!(d.kind, DestinationKind::Directory(PathBuf::from("/var/repo")));
}
