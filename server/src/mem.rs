use crate::Store;
use std::{
    collections::{BTreeMap, BTreeSet},
    io,
    sync::{Mutex, MutexGuard, PoisonError},
};

const TRIGGER_SUFFIX: &str = "_trigger";

#[derive(Debug, Default)]
struct MemState {
    attrs: BTreeMap<String, String>,
    writes: Vec<(String, String)>,
    failing_writes: BTreeSet<String>,
    failing_reads: BTreeSet<String>,
    timer: bool,
}

/// In-memory attributes store
///
/// Keeps a journal of every write and lets failures be injected per
/// attribute. With timer emulation enabled, writing `timer` into a
/// `*_trigger` attribute creates the matching `*_delay_on` and
/// `*_delay_off` attributes the way the kernel timer trigger does, and
/// writing anything else removes them.
#[derive(Debug, Default)]
pub struct MemStore {
    state: Mutex<MemState>,
}

impl MemStore {
    /// Create empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create store with initial attributes
    pub fn with_attrs<'a>(attrs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let store = Self::new();
        for (attr, value) in attrs {
            store.set(attr, value);
        }
        store
    }

    /// Toggle timer trigger emulation
    pub fn emulate_timer(self, enable: bool) -> Self {
        self.lock().timer = enable;
        self
    }

    /// Set attribute without journaling
    pub fn set(&self, attr: &str, value: &str) {
        self.lock().attrs.insert(attr.into(), value.into());
    }

    /// Get attribute value
    pub fn get(&self, attr: &str) -> Option<String> {
        self.lock().attrs.get(attr).cloned()
    }

    /// Make writes to attribute fail
    pub fn fail_write(&self, attr: &str) {
        self.lock().failing_writes.insert(attr.into());
    }

    /// Make reads of attribute fail
    pub fn fail_read(&self, attr: &str) {
        self.lock().failing_reads.insert(attr.into());
    }

    /// Journal of successful writes
    pub fn writes(&self) -> Vec<(String, String)> {
        self.lock().writes.clone()
    }

    /// Clear journal of writes
    pub fn clear_writes(&self) {
        self.lock().writes.clear();
    }

    fn lock(&self) -> MutexGuard<'_, MemState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Store for MemStore {
    fn write(&self, attr: &str, value: &str) -> io::Result<()> {
        let mut state = self.lock();

        if state.failing_writes.contains(attr) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("write to {attr} rejected"),
            ));
        }

        if state.timer {
            if let Some(prefix) = attr.strip_suffix(TRIGGER_SUFFIX) {
                let delay_on = format!("{prefix}_delay_on");
                let delay_off = format!("{prefix}_delay_off");
                if value == "timer" {
                    state.attrs.insert(delay_on, "500".into());
                    state.attrs.insert(delay_off, "500".into());
                } else {
                    state.attrs.remove(&delay_on);
                    state.attrs.remove(&delay_off);
                }
            }
        }

        state.attrs.insert(attr.into(), value.into());
        state.writes.push((attr.into(), value.into()));
        Ok(())
    }

    fn read(&self, attr: &str) -> io::Result<String> {
        let state = self.lock();

        if state.failing_reads.contains(attr) {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("read of {attr} rejected"),
            ));
        }

        state
            .attrs
            .get(attr)
            .map(|value| value.trim().into())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, attr.to_string()))
    }

    fn exists(&self, attr: &str) -> bool {
        self.lock().attrs.contains_key(attr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn journal_records_writes() {
        let store = MemStore::new();
        store.write("led_fan_green", "255").unwrap();
        store.write("led_fan_red", "0").unwrap();

        assert_eq!(
            store.writes(),
            [
                ("led_fan_green".to_string(), "255".to_string()),
                ("led_fan_red".to_string(), "0".to_string()),
            ]
        );
        assert_eq!(store.read("led_fan_green").unwrap(), "255");

        store.clear_writes();
        assert!(store.writes().is_empty());
    }

    #[test]
    fn injected_failures() {
        let store = MemStore::with_attrs([("led_fan_green", "0")]);
        store.fail_write("led_fan_green");
        store.fail_read("led_fan_green");

        assert!(store.write("led_fan_green", "255").is_err());
        assert!(store.read("led_fan_green").is_err());
        assert!(store.writes().is_empty());
        assert_eq!(store.get("led_fan_green").as_deref(), Some("0"));
    }

    #[test]
    fn timer_trigger_emulation() {
        let store = MemStore::new().emulate_timer(true);

        store.write("led_fan_red_trigger", "timer").unwrap();
        assert!(store.exists("led_fan_red_delay_on"));
        assert!(store.exists("led_fan_red_delay_off"));

        store.write("led_fan_red_trigger", "none").unwrap();
        assert!(!store.exists("led_fan_red_delay_on"));
        assert!(!store.exists("led_fan_red_delay_off"));
    }

    #[test]
    fn no_timer_emulation_by_default() {
        let store = MemStore::new();
        store.write("led_fan_red_trigger", "timer").unwrap();
        assert!(!store.exists("led_fan_red_delay_on"));
    }
}
