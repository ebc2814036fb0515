mod caps;
mod leds;

pub use caps::Capabilities;
pub use leds::{Channel, Color, LedKind};
