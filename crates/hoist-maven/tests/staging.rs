use std::fs;
use std::path::{Path, PathBuf};

use hoist_core::artifact::{ArtifactRecord, Coordinates};
use hoist_core::config::ChecksumAlgorithm;
use hoist_maven::metadata::parse_metadata;
use hoist_maven::staging::StagingRepository;
use hoist_util::errors::HoistError;
use tempfile::TempDir;

fn legacy_algorithms() -> Vec<ChecksumAlgorithm> {
    vec![ChecksumAlgorithm::Md5, ChecksumAlgorithm::Sha1]
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

/// `g:a:1.0-SNAPSHOT` jar with its POM plus an `a-0` attachment.
fn scenario_records(src: &Path) -> Vec<ArtifactRecord> {
    let coords = Coordinates::new("g", "a", "1.0-SNAPSHOT");
    let pom = write(src, "pom.xml", "<project/>");
    let jar = write(src, "a.jar", "jar bytes");
    let extra = write(src, "a-0.jar", "extra bytes");
    vec![
        ArtifactRecord::new(&coords, None, "pom").with_file(pom),
        ArtifactRecord::new(&coords, None, "jar").with_file(jar),
        ArtifactRecord::new(&Coordinates::new("g", "a-0", "1.0-SNAPSHOT"), None, "jar")
            .with_file(extra),
    ]
}

#[test]
fn test_scenario_tree() {
    let src = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    let staging = StagingRepository::open(root.path(), legacy_algorithms()).unwrap();

    let report = staging.stage(&scenario_records(src.path())).unwrap();
    assert_eq!(report.records, 3);

    let files = staging.files().unwrap();
    for expected in [
        "g/a/1.0-SNAPSHOT/a-1.0-SNAPSHOT.jar",
        "g/a/1.0-SNAPSHOT/a-1.0-SNAPSHOT.jar.md5",
        "g/a/1.0-SNAPSHOT/a-1.0-SNAPSHOT.jar.sha1",
        "g/a/1.0-SNAPSHOT/a-1.0-SNAPSHOT.pom",
        "g/a/1.0-SNAPSHOT/a-1.0-SNAPSHOT.pom.md5",
        "g/a/1.0-SNAPSHOT/a-1.0-SNAPSHOT.pom.sha1",
        "g/a-0/1.0-SNAPSHOT/a-0-1.0-SNAPSHOT.jar",
        "g/a-0/1.0-SNAPSHOT/a-0-1.0-SNAPSHOT.jar.md5",
        "g/a-0/1.0-SNAPSHOT/a-0-1.0-SNAPSHOT.jar.sha1",
        "g/a/maven-metadata.xml",
        "g/a-0/maven-metadata.xml",
    ] {
        assert!(files.contains(&PathBuf::from(expected)), "missing {expected}");
    }

    let mut sorted = files.clone();
    sorted.sort();
    assert_eq!(files, sorted);
}

#[test]
fn test_sidecars_are_lowercase_hex_without_newline() {
    let src = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    let staging = StagingRepository::open(root.path(), legacy_algorithms()).unwrap();
    staging.stage(&scenario_records(src.path())).unwrap();

    let sha1 = fs::read_to_string(root.path().join("g/a/1.0-SNAPSHOT/a-1.0-SNAPSHOT.jar.sha1"))
        .unwrap();
    assert_eq!(sha1, hoist_util::hash::sha1_bytes(b"jar bytes"));
    assert!(!sha1.ends_with('\n'));
    assert_eq!(sha1, sha1.to_lowercase());

    let md5 = fs::read_to_string(root.path().join("g/a/1.0-SNAPSHOT/a-1.0-SNAPSHOT.jar.md5"))
        .unwrap();
    assert_eq!(md5, hoist_util::hash::md5_bytes(b"jar bytes"));
}

#[test]
fn test_staging_twice_is_byte_identical() {
    let src = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    let staging = StagingRepository::open(root.path(), legacy_algorithms()).unwrap();
    let records = scenario_records(src.path());

    staging.stage(&records).unwrap();
    let jar = root.path().join("g/a/1.0-SNAPSHOT/a-1.0-SNAPSHOT.jar");
    let first = (fs::read(&jar).unwrap(), fs::read(jar.with_extension("jar.sha1")).unwrap());

    staging.stage(&records).unwrap();
    let second = (fs::read(&jar).unwrap(), fs::read(jar.with_extension("jar.sha1")).unwrap());
    assert_eq!(first, second);
}

#[test]
fn test_no_checksum_records_get_no_sidecars() {
    let src = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    let staging = StagingRepository::open(root.path(), legacy_algorithms()).unwrap();
    let file = write(src.path(), "descriptor.xml", "<d/>");
    let record = ArtifactRecord::new(&Coordinates::new("g", "a", "1.0"), Some("site"), "xml")
        .with_file(file)
        .without_checksums();

    let report = staging.stage(&[record]).unwrap();
    assert_eq!(report.files, vec![PathBuf::from("g/a/1.0/a-1.0-site.xml")]);
    assert!(!root.path().join("g/a/1.0/a-1.0-site.xml.sha1").exists());
}

#[test]
fn test_sha256_opt_in() {
    let src = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    let staging = StagingRepository::open(
        root.path(),
        vec![ChecksumAlgorithm::Sha1, ChecksumAlgorithm::Sha256],
    )
    .unwrap();
    staging.stage(&scenario_records(src.path())).unwrap();

    let jar = root.path().join("g/a/1.0-SNAPSHOT/a-1.0-SNAPSHOT.jar");
    assert!(jar.with_extension("jar.sha256").is_file());
    assert!(!jar.with_extension("jar.md5").exists());
}

#[test]
fn test_verify_detects_tampering() {
    let src = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    let staging = StagingRepository::open(root.path(), legacy_algorithms()).unwrap();
    staging.stage(&scenario_records(src.path())).unwrap();
    assert!(staging.verify().unwrap().is_empty());

    let jar = root.path().join("g/a-0/1.0-SNAPSHOT/a-0-1.0-SNAPSHOT.jar");
    fs::write(&jar, "tampered").unwrap();
    let mismatches = staging.verify().unwrap();
    assert_eq!(mismatches.len(), 2);
    assert!(mismatches.iter().all(|m| m.file == jar));
}

#[test]
fn test_metadata_accumulates_until_cleared() {
    let src = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    let staging = StagingRepository::open(root.path(), legacy_algorithms()).unwrap();
    let jar = write(src.path(), "core.jar", "core");

    for version in ["1.0", "1.1-SNAPSHOT"] {
        let record = ArtifactRecord::new(&Coordinates::new("com.acme", "core", version), None, "jar")
            .with_file(&jar);
        staging.stage(&[record]).unwrap();
    }

    let meta_path = root.path().join("com/acme/core/maven-metadata.xml");
    let meta = parse_metadata(&fs::read_to_string(&meta_path).unwrap()).unwrap();
    assert_eq!(meta.versions, vec!["1.0", "1.1-SNAPSHOT"]);
    assert_eq!(meta.release.as_deref(), Some("1.0"));
    assert_eq!(meta.latest.as_deref(), Some("1.1-SNAPSHOT"));
    assert!(root.path().join("com/acme/core/maven-metadata.xml.sha1").is_file());

    staging.clear().unwrap();
    assert!(staging.files().unwrap().is_empty());
    assert!(root.path().is_dir());
}

#[test]
fn test_missing_source_file_is_staging_error() {
    let root = TempDir::new().unwrap();
    let staging = StagingRepository::open(root.path(), legacy_algorithms()).unwrap();
    let record = ArtifactRecord::new(&Coordinates::new("g", "a", "1.0"), None, "jar")
        .with_file("/nonexistent/a.jar");

    let err = staging.stage(&[record]).unwrap_err();
    let hoist = err.downcast_ref::<HoistError>().unwrap();
    match hoist {
        HoistError::StagingIo { path, .. } => {
            assert!(path.ends_with("g/a/1.0/a-1.0.jar"));
        }
        other => panic!("unexpected error: {other}"),
    }
}
