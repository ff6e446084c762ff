//! Single-file artifact: `PHGBNDL\0` | u32 LE version | SHA-256(payload) | bincode payload.
//! `.json` paths hold bare serde_json for inspection. Writes go through a temp
//! file in the target directory and are renamed into place.

use crate::error::{DetectorError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::Path;

pub const MAGIC: [u8; 8] = *b"PHGBNDL\0";
pub const FORMAT_VERSION: u32 = 1;
const HEADER_LEN: usize = 8 + 4 + 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Binary,
    Json,
}

impl ArtifactFormat {
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ArtifactFormat::Json,
            _ => ArtifactFormat::Binary,
        }
    }
}

fn encode<T: Serialize>(value: &T, format: ArtifactFormat) -> Result<Vec<u8>> {
    match format {
        ArtifactFormat::Json => Ok(serde_json::to_vec_pretty(value)?),
        ArtifactFormat::Binary => {
            let payload = bincode::serialize(value)?;
            let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
            out.extend_from_slice(&MAGIC);
            out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
            out.extend_from_slice(&Sha256::digest(&payload));
            out.extend_from_slice(&payload);
            Ok(out)
        }
    }
}

fn decode<T: DeserializeOwned>(path: &Path, bytes: &[u8], format: ArtifactFormat) -> Result<T> {
    let fail = |reason: String| DetectorError::persistence(path, reason);
    match format {
        ArtifactFormat::Json => serde_json::from_slice(bytes).map_err(|e| fail(format!("invalid JSON: {e}"))),
        ArtifactFormat::Binary => {
            if bytes.len() < HEADER_LEN {
                return Err(fail(format!("truncated header ({} bytes)", bytes.len())));
            }
            let (magic, rest) = bytes.split_at(8);
            if magic != MAGIC {
                return Err(fail("not a bundle artifact (bad magic)".to_string()));
            }
            let (version, rest) = rest.split_at(4);
            let mut v = [0u8; 4];
            v.copy_from_slice(version);
            let version = u32::from_le_bytes(v);
            if version != FORMAT_VERSION {
                return Err(fail(format!(
                    "unsupported format version {version} (expected {FORMAT_VERSION})"
                )));
            }
            let (checksum, payload) = rest.split_at(32);
            if Sha256::digest(payload).as_slice() != checksum {
                return Err(fail("checksum mismatch".to_string()));
            }
            bincode::deserialize(payload).map_err(|e| fail(format!("decode failed: {e}")))
        }
    }
}

/// Serialize `value` to `path`, replacing any existing file atomically.
pub fn write_artifact<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let bytes = encode(value, ArtifactFormat::for_path(path))?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| DetectorError::persistence(path, format!("temp file: {e}")))?;
    tmp.write_all(&bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .map_err(|e| DetectorError::persistence(path, format!("rename: {}", e.error)))?;
    Ok(())
}

pub fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = std::fs::read(path).map_err(|e| DetectorError::persistence(path, e.to_string()))?;
    decode(path, &bytes, ArtifactFormat::for_path(path))
}
