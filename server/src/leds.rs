use crate::{
    log, BlinkWait, Color, Error, FaultSignal, Indicator, LedKind, Result, SharedIndicator, Store,
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, sync::Arc};

/// Single LED configuration
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct LedConfig {
    /// Explicit device id
    #[serde(default)]
    pub id: Option<String>,

    /// Device class
    #[serde(default)]
    pub kind: Option<LedKind>,

    /// Device index within class
    #[serde(default)]
    pub index: Option<u32>,

    /// Fault signals driving this LED
    #[serde(default)]
    pub faults: Vec<String>,
}

impl LedConfig {
    /// Resolve device id
    ///
    /// Explicit id goes first, then device class with index, then the LED
    /// name itself.
    pub fn device_id(&self, name: &str) -> String {
        if let Some(id) = &self.id {
            id.clone()
        } else if let Some(kind) = self.kind {
            kind.device_id(self.index)
        } else {
            name.into()
        }
    }
}

/// LEDs configuration
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct LedsConfig {
    /// LED configurations by name
    pub leds: BTreeMap<String, LedConfig>,
}

/// Configured LED
#[derive(Clone, Debug)]
pub enum Led {
    /// Directly controlled LED
    Plain(Indicator),

    /// LED owned by fault signals
    Shared(Arc<SharedIndicator>),
}

impl Led {
    /// Physical LED
    pub fn indicator(&self) -> &Indicator {
        match self {
            Self::Plain(led) => led,
            Self::Shared(shared) => shared.indicator(),
        }
    }

    /// Read back shown color
    pub fn get_status(&self) -> Result<Color> {
        match self {
            Self::Plain(led) => led.get_status(),
            Self::Shared(shared) => shared.read_status(),
        }
    }
}

/// LEDs control service
#[derive(educe::Educe)]
#[educe(Deref)]
pub struct Leds {
    /// LEDs
    #[educe(Deref)]
    leds: BTreeMap<String, Led>,

    /// Fault signals with names of LEDs they drive
    faults: BTreeMap<String, (String, FaultSignal)>,
}

impl Leds {
    /// Create LEDs service using specified config
    pub fn new(config: &LedsConfig, store: Arc<dyn Store>, blink_wait: BlinkWait) -> Result<Self> {
        let mut leds = BTreeMap::default();
        let mut faults = BTreeMap::default();

        for (name, config) in &config.leds {
            let id = config.device_id(name);
            let led = Indicator::new(&id, store.clone()).with_blink_wait(blink_wait);

            let led = if config.faults.is_empty() {
                log::debug!("{name}: LED {id}");
                Led::Plain(led)
            } else {
                log::debug!("{name}: Shared LED {id} of {:?}", config.faults);
                let shared = SharedIndicator::new(led);
                for fault in &config.faults {
                    if faults.contains_key(fault) {
                        return Err(Error::from(format!("Fault {fault} assigned twice")));
                    }
                    faults.insert(fault.clone(), (name.clone(), shared.register()));
                }
                Led::Shared(shared)
            };

            leds.insert(name.clone(), led);
        }

        Ok(Self { leds, faults })
    }

    /// Get present LEDs
    pub fn list(&self) -> impl Iterator<Item = &str> + '_ {
        self.leds.keys().map(String::as_str)
    }

    /// Get fault signals with names of LEDs they drive
    pub fn faults(&self) -> impl Iterator<Item = (&str, &str, &FaultSignal)> + '_ {
        self.faults
            .iter()
            .map(|(name, (led, signal))| (name.as_str(), led.as_str(), signal))
    }

    /// Get LED by name
    pub fn led(&self, name: &str) -> Result<&Led> {
        self.leds
            .get(name)
            .ok_or_else(|| Error::UnknownLed(name.into()))
    }

    /// Get fault signal by name
    pub fn fault(&self, name: &str) -> Result<&FaultSignal> {
        self.faults
            .get(name)
            .map(|(_, signal)| signal)
            .ok_or_else(|| Error::UnknownFault(name.into()))
    }

    /// Show color on directly controlled LED
    pub fn set_status(&self, name: &str, color: Color) -> Result<bool> {
        match self.led(name)? {
            Led::Plain(led) => Ok(led.set_status(color)),
            Led::Shared(_) => Err(Error::from(format!(
                "LED {name} is driven by fault signals"
            ))),
        }
    }

    /// Read back LED
    pub fn get_status(&self, name: &str) -> Result<Color> {
        self.led(name)?.get_status()
    }

    /// Change fault signal
    pub fn set_fault(&self, name: &str, color: Color) -> Result<bool> {
        Ok(self.fault(name)?.set_status(color))
    }

    /// Arbitrate every shared LED
    ///
    /// Returns `false` when any of them cannot be updated.
    pub fn apply(&self) -> bool {
        let mut done = true;
        for (name, led) in &self.leds {
            if let Led::Shared(shared) = led {
                if !shared.recompute_and_apply() {
                    log::warn!("{name}: Unable to apply fault signals");
                    done = false;
                }
            }
        }
        done
    }
}
