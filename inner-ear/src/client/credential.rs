//! Locally persisted credential.
//!
//! The stored form is obfuscated, not encrypted: a byte-wise XOR with a fixed
//! key followed by standard base64. It keeps the key out of casual view in a
//! file listing and nothing more. Anyone holding the file can recover it.

use std::io;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

const OBFUSCATION_KEY: &[u8] = b"INNER_EAR_JAZZ_MENTOR_SECRET";

fn xor_with_key(bytes: &[u8]) -> Vec<u8> {
    bytes
        .iter()
        .zip(OBFUSCATION_KEY.iter().cycle())
        .map(|(byte, key)| byte ^ key)
        .collect()
}

pub fn obfuscate(plain: &str) -> String {
    STANDARD.encode(xor_with_key(plain.as_bytes()))
}

/// Reverse [`obfuscate`]. `None` when the input is not valid base64 or does
/// not decode to UTF-8.
pub fn deobfuscate(encoded: &str) -> Option<String> {
    let bytes = STANDARD.decode(encoded.trim()).ok()?;
    String::from_utf8(xor_with_key(&bytes)).ok()
}

/// File-backed credential store.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored key, if one exists and decodes to something non-empty.
    pub fn load(&self) -> Option<String> {
        let stored = match std::fs::read_to_string(&self.path) {
            Ok(stored) => stored,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read stored API key");
                return None;
            }
        };

        let key = deobfuscate(&stored).filter(|key| !key.trim().is_empty());
        if key.is_none() {
            tracing::warn!(path = %self.path.display(), "Stored API key could not be decoded");
        }
        key
    }

    pub fn save(&self, api_key: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, obfuscate(api_key.trim()))
    }

    /// Remove the stored key. Clearing an empty store is not an error.
    pub fn clear(&self) -> io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}
