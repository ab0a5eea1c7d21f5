//! Deterministic `tar+gzip` packing of a staging directory.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use tar::{EntryType, Header};
use walkdir::WalkDir;

use hoist_util::errors::HoistError;

pub const LAYER_MEDIA_TYPE: &str = "application/vnd.oci.image.layer.v1.tar+gzip";
pub const EMPTY_CONFIG_MEDIA_TYPE: &str = "application/vnd.oci.empty.v1+json";
pub const EMPTY_CONFIG: &[u8] = b"{}";

pub const ANNOTATION_TITLE: &str = "org.opencontainers.image.title";
pub const ANNOTATION_UNPACK: &str = "io.deis.oras.content.unpack";
pub const ANNOTATION_DIGEST: &str = "io.deis.oras.content.digest";

/// A packed directory, ready to be pushed as one layer.
#[derive(Debug, Clone)]
pub struct DirectoryBundle {
    /// Directory name; also the prefix of every tar entry.
    pub title: String,
    /// Gzip-compressed tar.
    pub data: Vec<u8>,
    /// `sha256:<hex>` of the uncompressed tar.
    pub tar_digest: String,
    /// Regular files packed, relative to the root, in archive order.
    pub files: Vec<PathBuf>,
}

impl DirectoryBundle {
    /// Layer annotations understood by ORAS for directory content.
    pub fn annotations(&self) -> HashMap<String, String> {
        HashMap::from([
            (ANNOTATION_TITLE.to_string(), self.title.clone()),
            (ANNOTATION_UNPACK.to_string(), "true".to_string()),
            (ANNOTATION_DIGEST.to_string(), self.tar_digest.clone()),
        ])
    }
}

fn pack_err(root: &Path, e: impl std::fmt::Display) -> HoistError {
    HoistError::Generic {
        message: format!("Failed to pack {}: {e}", root.display()),
    }
}

/// Pack `root` into a tar+gzip blob.
///
/// Entries are sorted and their headers normalized (mtime 0, uid/gid 0,
/// mode 0644 for files, 0755 for directories) so the same tree always
/// yields the same bytes.
pub fn bundle_directory(root: &Path) -> miette::Result<DirectoryBundle> {
    if !root.is_dir() {
        return Err(HoistError::Generic {
            message: format!("{} is not a directory", root.display()),
        }
        .into());
    }
    let title = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "artifacts".to_string());

    let mut builder = tar::Builder::new(Vec::new());
    let mut files = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| pack_err(root, e))?;
        let Ok(rel) = entry.path().strip_prefix(root) else {
            continue;
        };
        let name = Path::new(&title).join(rel);

        let mut header = Header::new_gnu();
        header.set_mtime(0);
        header.set_uid(0);
        header.set_gid(0);

        if entry.file_type().is_dir() {
            header.set_entry_type(EntryType::Directory);
            header.set_mode(0o755);
            header.set_size(0);
            header.set_cksum();
            builder
                .append_data(&mut header, &name, std::io::empty())
                .map_err(|e| pack_err(root, e))?;
        } else if entry.file_type().is_file() {
            let data = std::fs::read(entry.path()).map_err(|e| pack_err(root, e))?;
            header.set_entry_type(EntryType::Regular);
            header.set_mode(0o644);
            header.set_size(data.len() as u64);
            header.set_cksum();
            builder
                .append_data(&mut header, &name, data.as_slice())
                .map_err(|e| pack_err(root, e))?;
            files.push(rel.to_path_buf());
        }
    }

    let tar = builder.into_inner().map_err(|e| pack_err(root, e))?;
    let tar_digest = format!("sha256:{}", hoist_util::hash::sha256_bytes(&tar));

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&tar).map_err(|e| pack_err(root, e))?;
    let data = encoder.finish().map_err(|e| pack_err(root, e))?;

    tracing::debug!(
        "packed {} files from {} ({} compressed)",
        files.len(),
        root.display(),
        hoist_util::progress::format_size(data.len() as u64)
    );

    Ok(DirectoryBundle {
        title,
        data,
        tar_digest,
        files,
    })
}
