//! Key-file fixtures for session configuration tests.

use std::path::PathBuf;

use uuid::Uuid;

/// Session key file removed on drop.
#[derive(Debug)]
pub struct TempKeyFile {
    path: PathBuf,
}

impl TempKeyFile {
    /// Write `len` bytes of key material to a fresh file in the temp dir.
    pub fn new(len: usize) -> std::io::Result<Self> {
        let path = std::env::temp_dir().join(format!("storefront-key-{}", Uuid::new_v4()));
        std::fs::write(&path, vec![b'k'; len])?;
        Ok(Self { path })
    }

    /// Path as a lossy UTF-8 string, ready for an env var.
    pub fn path_str(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

impl Drop for TempKeyFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// A path in the temp dir that does not exist.
pub fn missing_key_path() -> String {
    std::env::temp_dir()
        .join(format!("storefront-missing-{}", Uuid::new_v4()))
        .to_string_lossy()
        .into_owned()
}
