use crate::{log, BlinkWait, Color, FsStore, Leds, LedsConfig, Result, Store};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

/// Server configuration
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ServerConfig {
    /// LED attributes directory
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Readback period (milliseconds)
    #[serde(default = "default_poll")]
    pub poll: u32,

    /// Waiting for blink delay attributes
    #[serde(default)]
    pub blink_wait: BlinkWait,

    /// LEDs
    #[serde(default)]
    pub leds: LedsConfig,
}

fn default_root() -> PathBuf {
    crate::store::DEFAULT_ROOT.into()
}

const fn default_poll() -> u32 {
    1000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            poll: default_poll(),
            blink_wait: BlinkWait::default(),
            leds: LedsConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Read config from file
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw: Vec<u8> = tokio::fs::read(path).await?;
        let utf = core::str::from_utf8(&raw)?;
        Self::from_toml(utf)
    }

    /// Parse config from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        let cfg = toml::from_str::<serde_json::Value>(text)?;
        let cfg = serde_json::from_value(cfg)?;

        Ok(cfg)
    }
}

struct ServerState {
    /// LEDs
    leds: Leds,

    /// Readback period
    poll: Duration,
}

/// Server instance
#[derive(Clone)]
pub struct Server {
    state: Arc<ServerState>,
}

impl Server {
    /// Instantiate server using provided config
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let store = FsStore::new(&config.root);
        log::info!("Setup LEDs in {}", store.root().display());
        Self::with_store(config, Arc::new(store))
    }

    /// Instantiate server on top of specified store
    pub fn with_store(config: &ServerConfig, store: Arc<dyn Store>) -> Result<Self> {
        let leds = Leds::new(&config.leds, store, config.blink_wait)?;

        Ok(Self {
            state: Arc::new(ServerState {
                leds,
                poll: Duration::from_millis(config.poll as _),
            }),
        })
    }

    /// Get LEDs
    pub fn leds(&self) -> &Leds {
        &self.state.leds
    }

    /// Readback period
    pub fn poll_interval(&self) -> Duration {
        self.state.poll
    }

    /// Run blocking LED operation outside of async runtime
    pub async fn blocking<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Leds) -> T + Send + 'static,
    {
        let server = self.clone();
        Ok(tokio::task::spawn_blocking(move || op(server.leds())).await?)
    }

    /// Arbitrate every shared LED
    pub async fn apply(&self) -> Result<bool> {
        self.blocking(Leds::apply).await
    }

    /// Read back all LEDs
    ///
    /// LEDs which cannot be read are logged and left out.
    pub async fn readback(&self) -> Result<BTreeMap<String, Color>> {
        self.blocking(|leds| {
            leds.iter()
                .filter_map(|(name, led)| match led.get_status() {
                    Ok(color) => Some((name.clone(), color)),
                    Err(error) => {
                        log::warn!("{name}: {error}");
                        None
                    }
                })
                .collect()
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Led, MemStore};

    const CONFIG: &str = r#"
        root = "/tmp/leds"
        poll = 250
        blink_wait = { budget = 100 }

        [leds.status]
        kind = "system"
        faults = ["psu", "fan"]

        [leds.psu1]
        kind = "psu"
        index = 1
    "#;

    #[test]
    fn parse_config() {
        let config = ServerConfig::from_toml(CONFIG).unwrap();

        assert_eq!(config.root, Path::new("/tmp/leds"));
        assert_eq!(config.poll, 250);
        assert_eq!(
            config.blink_wait,
            BlinkWait {
                initial: 10,
                budget: 100
            }
        );
        assert_eq!(config.leds.leds.len(), 2);
        assert_eq!(config.leds.leds["status"].faults, ["psu", "fan"]);
    }

    #[test]
    fn empty_config() {
        let config = ServerConfig::from_toml("").unwrap();

        assert_eq!(config.root, Path::new(crate::store::DEFAULT_ROOT));
        assert_eq!(config.poll, 1000);
        assert_eq!(config.blink_wait, BlinkWait::default());
        assert!(config.leds.leds.is_empty());
    }

    #[test]
    fn bad_config() {
        assert!(ServerConfig::from_toml("poll = \"often\"").is_err());
        assert!(ServerConfig::from_toml("[leds.x]\nkind = \"lamp\"").is_err());
    }

    #[tokio::test]
    async fn config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hwled.toml");
        std::fs::write(&path, CONFIG).unwrap();

        let config = ServerConfig::from_file(&path).await.unwrap();
        assert_eq!(config.poll, 250);

        assert!(ServerConfig::from_file(dir.path().join("absent.toml"))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn apply_and_readback() {
        let config = ServerConfig::from_toml(CONFIG).unwrap();
        let store = Arc::new(MemStore::with_attrs([
            ("led_status_capability", "green red"),
            ("led_status_green", "0"),
            ("led_status_red", "0"),
        ]));
        let server = Server::with_store(&config, store.clone()).unwrap();

        assert_eq!(server.poll_interval(), Duration::from_millis(250));
        assert!(matches!(server.leds().led("psu1"), Ok(Led::Plain(_))));
        assert!(server.apply().await.unwrap());
        assert_eq!(store.get("led_status_green").as_deref(), Some("255"));

        let states = server.readback().await.unwrap();
        assert_eq!(states["status"], Color::Green);
        // no capabilities reads as off
        assert_eq!(states["psu1"], Color::Off);
    }
}
