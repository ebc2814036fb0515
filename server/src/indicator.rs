use crate::{log, Capabilities, Channel, Color, Error, LedKind, Result, Store};
use serde::{Deserialize, Serialize};
use std::{
    sync::Arc,
    thread::sleep,
    time::{Duration, Instant},
};

/// Channel value when lit
pub const LED_ON: &str = "255";

/// Channel value when dark
pub const LED_OFF: &str = "0";

/// Blink delay on and off (milliseconds)
pub const LED_BLINK: &str = "50";

const TRIGGER_TIMER: &str = "timer";
const TRIGGER_NONE: &str = "none";

/// Waiting for blink delay attributes
///
/// Delay attributes show up only after the timer trigger is activated, and
/// the driver may need some time to create them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct BlinkWait {
    /// First poll interval (milliseconds)
    #[serde(default = "default_initial")]
    pub initial: u64,

    /// Total waiting budget (milliseconds)
    #[serde(default = "default_budget")]
    pub budget: u64,
}

const fn default_initial() -> u64 {
    10
}

const fn default_budget() -> u64 {
    5000
}

impl Default for BlinkWait {
    fn default() -> Self {
        Self {
            initial: default_initial(),
            budget: default_budget(),
        }
    }
}

impl BlinkWait {
    /// Poll until `ready` holds, doubling the interval each time
    ///
    /// Gives up once the budget is spent. The last sleep is cut to what is
    /// left of the budget.
    pub fn poll(&self, mut ready: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_millis(self.budget);
        let mut delay = Duration::from_millis(self.initial.max(1));

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            if ready() {
                return true;
            }
            sleep(delay.min(remaining));
            delay *= 2;
        }
    }
}

/// What has to be done with hardware to show a color
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Target {
    Steady(Channel),
    Blink(Channel),
    Off,
}

/// Single physical LED
///
/// All state lives in device attributes, so an indicator is only a device
/// id bound to a store.
#[derive(Clone)]
pub struct Indicator {
    id: String,
    store: Arc<dyn Store>,
    blink_wait: BlinkWait,
}

impl core::fmt::Debug for Indicator {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("Indicator")
            .field("id", &self.id)
            .field("blink_wait", &self.blink_wait)
            .finish()
    }
}

impl Indicator {
    /// Create indicator for device id
    pub fn new(id: impl Into<String>, store: Arc<dyn Store>) -> Self {
        Self {
            id: id.into(),
            store,
            blink_wait: BlinkWait::default(),
        }
    }

    /// Fan LED, optionally indexed
    pub fn fan(index: Option<u32>, store: Arc<dyn Store>) -> Self {
        Self::new(LedKind::Fan.device_id(index), store)
    }

    /// Power supply LED, optionally indexed
    pub fn psu(index: Option<u32>, store: Arc<dyn Store>) -> Self {
        Self::new(LedKind::Psu.device_id(index), store)
    }

    /// System status LED
    pub fn system(store: Arc<dyn Store>) -> Self {
        Self::new(LedKind::System.device_id(None), store)
    }

    /// Override waiting for blink delay attributes
    pub fn with_blink_wait(mut self, blink_wait: BlinkWait) -> Self {
        self.blink_wait = blink_wait;
        self
    }

    /// Device id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Read current capabilities
    pub fn capabilities(&self) -> Result<Capabilities> {
        self.store
            .read(&self.attr("capability"))
            .map(|caps| Capabilities::parse(&caps))
            .map_err(|source| Error::CapabilityUnreadable {
                id: self.id.clone(),
                source,
            })
    }

    /// Show color
    ///
    /// Failures are logged and reported as `false`. Writes issued before a
    /// failure are kept.
    ///
    /// A static color lights only its own channel. Other channels are left
    /// as they are, so switching from red to green keeps the red channel
    /// lit until `off` is shown.
    pub fn set_status(&self, color: Color) -> bool {
        match self.try_set_status(color) {
            Ok(()) => {
                log::debug!("{}: Status set to {color}", self.id);
                true
            }
            Err(error) => {
                log::warn!("{}: Unable to set status {color}: {error}", self.id);
                false
            }
        }
    }

    /// Read back shown color
    ///
    /// Unreadable capabilities mean `off`. An orange channel which is lit is
    /// reported as red.
    pub fn get_status(&self) -> Result<Color> {
        let caps = match self.capabilities() {
            Ok(caps) => caps,
            Err(error) => {
                log::debug!("{}: {error}", self.id);
                return Ok(Color::Off);
            }
        };

        if let Some(color) = self.blink_status(&caps) {
            return Ok(color);
        }

        if self.read_channel(Channel::Green)? != LED_OFF {
            return Ok(Color::Green);
        }

        if caps.supports(Color::Red) && self.read_channel(Channel::Red)? != LED_OFF {
            return Ok(Color::Red);
        }

        if caps.supports(Color::Orange) && self.read_channel(Channel::Orange)? != LED_OFF {
            return Ok(Color::Red);
        }

        Ok(Color::Off)
    }

    fn try_set_status(&self, color: Color) -> Result<()> {
        let caps = self.capabilities()?;
        let target = self.resolve(color, &caps)?;

        self.stop_blink(&caps);

        match target {
            Target::Steady(channel) => self.write(&self.channel_attr(channel), LED_ON),
            Target::Blink(channel) => self.start_blink(channel),
            Target::Off => {
                for channel in Channel::ALL {
                    if caps.supports(channel.color()) {
                        self.write(&self.channel_attr(channel), LED_OFF)?;
                    }
                }
                Ok(())
            }
        }
    }

    /// Pick hardware target for color, applying fallbacks
    fn resolve(&self, color: Color, caps: &Capabilities) -> Result<Target> {
        let target = if color.is_blink() {
            // red and orange blinking substitute each other
            [Some(color), color.blink_alternate()]
                .into_iter()
                .flatten()
                .find(|color| caps.supports(*color))
                .and_then(Color::channel)
                .map(Target::Blink)
        } else {
            match color {
                Color::Off => Some(Target::Off),
                Color::Green => caps
                    .supports(Color::Green)
                    .then_some(Target::Steady(Channel::Green)),
                // orange stands in for red on LEDs without red channel
                Color::Red => [Channel::Red, Channel::Orange]
                    .into_iter()
                    .find(|channel| caps.supports(channel.color()))
                    .map(Target::Steady),
                _ => None,
            }
        };

        target.ok_or_else(|| Error::UnsupportedColor {
            id: self.id.clone(),
            color,
        })
    }

    fn stop_blink(&self, caps: &Capabilities) {
        for channel in Channel::ALL {
            if caps.supports(channel.blink_color()) {
                if let Err(error) = self.write(&self.trigger_attr(channel), TRIGGER_NONE) {
                    log::debug!("{}: Unable to stop {channel} blinking: {error}", self.id);
                }
            }
        }
    }

    fn start_blink(&self, channel: Channel) -> Result<()> {
        self.write(&self.trigger_attr(channel), TRIGGER_TIMER)?;

        let delay_on = self.delay_on_attr(channel);
        let delay_off = self.delay_off_attr(channel);

        if !self
            .blink_wait
            .poll(|| self.store.exists(&delay_on) && self.store.exists(&delay_off))
        {
            return Err(Error::BlinkNotReady(self.id.clone()));
        }

        self.write(&delay_on, LED_BLINK)?;
        self.write(&delay_off, LED_BLINK)
    }

    fn blink_status(&self, caps: &Capabilities) -> Option<Color> {
        Channel::ALL
            .into_iter()
            .filter(|channel| caps.supports(channel.blink_color()))
            .find(|channel| self.is_blinking(*channel))
            .map(Channel::blink_color)
    }

    fn is_blinking(&self, channel: Channel) -> bool {
        let delay_on = self.store.read_or(&self.delay_on_attr(channel), LED_OFF, true);
        let delay_off = self.store.read_or(&self.delay_off_attr(channel), LED_OFF, true);
        delay_on != LED_OFF && delay_off != LED_OFF
    }

    fn read_channel(&self, channel: Channel) -> Result<String> {
        let attr = self.channel_attr(channel);
        self.store
            .read(&attr)
            .map_err(|source| Error::Read { attr, source })
    }

    fn write(&self, attr: &str, value: &str) -> Result<()> {
        log::trace!("{}: {attr} <- {value}", self.id);
        self.store.write(attr, value).map_err(|source| Error::Write {
            attr: attr.into(),
            source,
        })
    }

    fn attr(&self, name: impl core::fmt::Display) -> String {
        format!("led_{}_{}", self.id, name)
    }

    fn channel_attr(&self, channel: Channel) -> String {
        self.attr(channel)
    }

    fn trigger_attr(&self, channel: Channel) -> String {
        self.attr(format_args!("{channel}_trigger"))
    }

    fn delay_on_attr(&self, channel: Channel) -> String {
        self.attr(format_args!("{channel}_delay_on"))
    }

    fn delay_off_attr(&self, channel: Channel) -> String {
        self.attr(format_args!("{channel}_delay_off"))
    }
}
