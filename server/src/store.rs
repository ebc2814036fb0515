use crate::log;
use std::{
    io,
    path::{Path, PathBuf},
};

/// Default attributes directory of hardware management service
pub const DEFAULT_ROOT: &str = "/var/run/hw-management/led";

/// Device attributes store
///
/// Attributes are addressed by plain names like `led_fan1_green`. The store
/// decides where those live.
pub trait Store: Send + Sync {
    /// Write value to attribute
    fn write(&self, attr: &str, value: &str) -> io::Result<()>;

    /// Read attribute value with surrounding whitespace trimmed
    fn read(&self, attr: &str) -> io::Result<String>;

    /// Check attribute presence
    fn exists(&self, attr: &str) -> bool;

    /// Read attribute value or fall back to default
    ///
    /// Read failures are logged unless `quiet` is set.
    fn read_or(&self, attr: &str, default: &str, quiet: bool) -> String {
        match self.read(attr) {
            Ok(value) => value,
            Err(error) => {
                if !quiet {
                    log::warn!("Unable to read {attr}: {error}");
                }
                default.into()
            }
        }
    }
}

/// Store backed by a directory of attribute files
#[derive(Clone, Debug)]
pub struct FsStore {
    root: PathBuf,
}

impl Default for FsStore {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT)
    }
}

impl FsStore {
    /// Create store rooted at directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Attributes directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, attr: &str) -> PathBuf {
        self.root.join(attr)
    }
}

impl Store for FsStore {
    fn write(&self, attr: &str, value: &str) -> io::Result<()> {
        log::trace!("Write {attr}: {value}");
        std::fs::write(self.path(attr), value)
    }

    fn read(&self, attr: &str) -> io::Result<String> {
        let value = std::fs::read_to_string(self.path(attr))?;
        log::trace!("Read {attr}: {}", value.trim());
        Ok(value.trim().into())
    }

    fn exists(&self, attr: &str) -> bool {
        self.path(attr).exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_trims_value() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("led_fan1_capability"), "green red\n").unwrap();

        let store = FsStore::new(dir.path());
        assert_eq!(store.read("led_fan1_capability").unwrap(), "green red");
    }

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());

        assert!(!store.exists("led_status_green"));
        store.write("led_status_green", "255").unwrap();
        assert!(store.exists("led_status_green"));
        assert_eq!(store.read("led_status_green").unwrap(), "255");
    }

    #[test]
    fn missing_attribute() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());

        let error = store.read("led_psu_red").unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::NotFound);
        assert_eq!(store.read_or("led_psu_red", "0", true), "0");
        assert_eq!(store.read_or("led_psu_red", "1", false), "1");
    }

    #[test]
    fn write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path().join("absent"));

        assert!(store.write("led_fan_green", "255").is_err());
    }

    #[test]
    fn default_root() {
        assert_eq!(FsStore::default().root(), Path::new(DEFAULT_ROOT));
    }
}
