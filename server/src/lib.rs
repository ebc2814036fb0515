mod indicator;
mod leds;
mod mem;
mod result;
mod server;
mod shared;
mod store;

pub use tracing as log;

pub use hwled_core::{Capabilities, Channel, Color, LedKind};
pub use indicator::{BlinkWait, Indicator, LED_BLINK, LED_OFF, LED_ON};
pub use leds::{Led, LedConfig, Leds, LedsConfig};
pub use mem::MemStore;
pub use server::{Server, ServerConfig};
pub use shared::{arbitrate, FaultSignal, SharedIndicator};
pub use store::{FsStore, Store, DEFAULT_ROOT};

pub use result::{Error, Result};
