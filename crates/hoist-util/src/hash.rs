use md5::Md5;
use sha1::Sha1;
use sha2::digest::Output;
use sha2::{Digest, Sha256, Sha512};
use std::fmt::LowerHex;
use std::io::Read;
use std::path::Path;

/// Stream a file through digest `D`, returning a lowercase hex string.
pub fn digest_file<D: Digest>(path: &Path) -> std::io::Result<String>
where
    Output<D>: LowerHex,
{
    let mut file = std::fs::File::open(path)?;
    let mut hasher = D::new();
    let mut buffer = [0u8; 8192];
    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Digest a byte slice with `D`, returning a lowercase hex string.
pub fn digest_bytes<D: Digest>(data: &[u8]) -> String
where
    Output<D>: LowerHex,
{
    format!("{:x}", D::digest(data))
}

/// Compute the SHA-256 hash of a file, returning a lowercase hex string.
pub fn sha256_file(path: &Path) -> std::io::Result<String> {
    digest_file::<Sha256>(path)
}

/// Compute the SHA-256 hash of a byte slice, returning a lowercase hex string.
pub fn sha256_bytes(data: &[u8]) -> String {
    digest_bytes::<Sha256>(data)
}

/// Compute the SHA-512 hash of a file.
pub fn sha512_file(path: &Path) -> std::io::Result<String> {
    digest_file::<Sha512>(path)
}

/// Compute the SHA-512 hash of a byte slice.
pub fn sha512_bytes(data: &[u8]) -> String {
    digest_bytes::<Sha512>(data)
}

/// Compute the SHA-1 hash of a file.
pub fn sha1_file(path: &Path) -> std::io::Result<String> {
    digest_file::<Sha1>(path)
}

/// Compute the SHA-1 hash of a byte slice.
pub fn sha1_bytes(data: &[u8]) -> String {
    digest_bytes::<Sha1>(data)
}

/// Compute the MD5 hash of a file. Legacy Maven sidecars only.
pub fn md5_file(path: &Path) -> std::io::Result<String> {
    digest_file::<Md5>(path)
}

/// Compute the MD5 hash of a byte slice.
pub fn md5_bytes(data: &[u8]) -> String {
    digest_bytes::<Md5>(data)
}
