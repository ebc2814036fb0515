use crate::{log, Color, Error, Indicator, Result};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Pick the winning color of fault signals
///
/// Starts from green, the lowest priority. Any color without priority
/// aborts arbitration.
pub fn arbitrate(colors: impl IntoIterator<Item = Color>) -> Result<Color> {
    let mut target = Color::Green;

    for color in colors {
        let priority = color
            .priority()
            .ok_or(Error::ArbitrationInvalidColor(color))?;
        if Some(priority) < target.priority() {
            target = color;
        }
    }

    Ok(target)
}

/// Physical LED driven by several fault signals
///
/// Staged colors of registered signals live here, so staging, arbitration,
/// hardware update and rollback all happen under one lock.
#[derive(Debug)]
pub struct SharedIndicator {
    led: Indicator,
    signals: Mutex<Vec<Color>>,
}

impl SharedIndicator {
    /// Wrap physical LED
    pub fn new(led: Indicator) -> Arc<Self> {
        Arc::new(Self {
            led,
            signals: Mutex::new(Vec::new()),
        })
    }

    /// Physical LED
    pub fn indicator(&self) -> &Indicator {
        &self.led
    }

    /// Register new fault signal
    ///
    /// Signal starts green. Signals are arbitrated in registration order.
    pub fn register(self: &Arc<Self>) -> FaultSignal {
        let mut signals = self.lock();
        signals.push(Color::default());

        FaultSignal {
            shared: Arc::downgrade(self),
            slot: signals.len() - 1,
        }
    }

    /// Staged colors of registered signals
    pub fn colors(&self) -> Vec<Color> {
        self.lock().clone()
    }

    /// Arbitrate signals and show winner on physical LED
    pub fn recompute_and_apply(&self) -> bool {
        let signals = self.lock();
        self.apply(&signals)
    }

    /// Read back physical LED
    pub fn read_status(&self) -> Result<Color> {
        self.led.get_status()
    }

    fn apply(&self, signals: &[Color]) -> bool {
        match arbitrate(signals.iter().copied()) {
            Ok(color) => {
                log::debug!("{}: Arbitrated {color}", self.led.id());
                self.led.set_status(color)
            }
            Err(error) => {
                log::warn!("{}: {error}", self.led.id());
                false
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Color>> {
        // slot table holds plain colors, valid even after a panic
        self.signals.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Logical fault indicator of single component
///
/// Holds only a weak handle to its shared LED.
#[derive(Clone, Debug)]
pub struct FaultSignal {
    shared: Weak<SharedIndicator>,
    slot: usize,
}

impl FaultSignal {
    /// Stage color and update shared LED
    ///
    /// Previous color is restored when the shared LED cannot be updated.
    pub fn set_status(&self, color: Color) -> bool {
        let shared = match self.upgrade() {
            Ok(shared) => shared,
            Err(error) => {
                log::warn!("{error}");
                return false;
            }
        };

        let mut signals = shared.lock();
        let Some(&previous) = signals.get(self.slot) else {
            return false;
        };

        signals[self.slot] = color;
        if shared.apply(&signals) {
            true
        } else {
            log::debug!(
                "{}: Rollback fault signal {} to {previous}",
                shared.led.id(),
                self.slot
            );
            signals[self.slot] = previous;
            false
        }
    }

    /// Staged color
    ///
    /// Signal of dropped shared LED reads as `off`.
    pub fn read_color(&self) -> Color {
        self.upgrade()
            .ok()
            .and_then(|shared| shared.lock().get(self.slot).copied())
            .unwrap_or(Color::Off)
    }

    /// Read back shared LED
    pub fn read_status(&self) -> Result<Color> {
        self.upgrade()?.read_status()
    }

    fn upgrade(&self) -> Result<Arc<SharedIndicator>> {
        Ok(self
            .shared
            .upgrade()
            .ok_or("Seems shared LED is out of life")?)
    }
}
