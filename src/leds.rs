use parse_display::{Display, FromStr};
use serde::{Deserialize, Serialize};

/// LED color state
///
/// Blink variants are separate states because the hardware drives them through
/// an independent set of trigger and delay attributes.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Deserialize,
    Serialize,
    FromStr,
    Display,
)]
#[serde(rename_all = "snake_case")]
#[display(style = "snake_case")]
pub enum Color {
    /// Steady green
    Green,

    /// Blinking green
    GreenBlink,

    /// Steady red
    Red,

    /// Blinking red
    RedBlink,

    /// Steady orange
    Orange,

    /// Blinking orange
    OrangeBlink,

    /// All channels off
    Off,
}

impl Default for Color {
    fn default() -> Self {
        Self::Green
    }
}

impl Color {
    /// All known colors
    pub const ALL: [Color; 7] = [
        Color::Green,
        Color::GreenBlink,
        Color::Red,
        Color::RedBlink,
        Color::Orange,
        Color::OrangeBlink,
        Color::Off,
    ];

    /// Whether color is rendered by the blink timer
    pub fn is_blink(self) -> bool {
        matches!(self, Self::GreenBlink | Self::RedBlink | Self::OrangeBlink)
    }

    /// Physical channel which renders this color
    pub fn channel(self) -> Option<Channel> {
        Some(match self {
            Self::Green | Self::GreenBlink => Channel::Green,
            Self::Red | Self::RedBlink => Channel::Red,
            Self::Orange | Self::OrangeBlink => Channel::Orange,
            Self::Off => return None,
        })
    }

    /// Same-family blink substitute
    ///
    /// Red and orange blinking stand in for each other on LEDs which have only
    /// one of them.
    pub fn blink_alternate(self) -> Option<Color> {
        match self {
            Self::RedBlink => Some(Self::OrangeBlink),
            Self::OrangeBlink => Some(Self::RedBlink),
            _ => None,
        }
    }

    /// Arbitration priority of shared LED input
    ///
    /// Lower value wins. Colors without priority cannot take part in
    /// arbitration.
    pub fn priority(self) -> Option<u8> {
        match self {
            Self::Red => Some(0),
            Self::Green => Some(1),
            _ => None,
        }
    }
}

/// Physical color channel of LED
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Deserialize,
    Serialize,
    FromStr,
    Display,
)]
#[serde(rename_all = "snake_case")]
#[display(style = "snake_case")]
pub enum Channel {
    Green,
    Red,
    Orange,
}

impl Channel {
    /// Channels in readback order
    pub const ALL: [Channel; 3] = [Channel::Green, Channel::Red, Channel::Orange];

    /// Steady color of channel
    pub fn color(self) -> Color {
        match self {
            Self::Green => Color::Green,
            Self::Red => Color::Red,
            Self::Orange => Color::Orange,
        }
    }

    /// Blinking color of channel
    pub fn blink_color(self) -> Color {
        match self {
            Self::Green => Color::GreenBlink,
            Self::Red => Color::RedBlink,
            Self::Orange => Color::OrangeBlink,
        }
    }
}

/// Device class of LED
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Deserialize,
    Serialize,
    FromStr,
    Display,
)]
#[serde(rename_all = "kebab-case")]
#[display(style = "kebab-case")]
pub enum LedKind {
    /// Fan module LED
    Fan,

    /// Power supply LED
    Psu,

    /// System status LED
    System,
}

impl LedKind {
    /// Device id used to build attribute names
    pub fn device_id(self, index: Option<u32>) -> String {
        match (self, index) {
            (Self::Fan, Some(index)) => format!("fan{index}"),
            (Self::Fan, None) => "fan".into(),
            (Self::Psu, Some(index)) => format!("psu{index}"),
            (Self::Psu, None) => "psu".into(),
            (Self::System, _) => "status".into(),
        }
    }
}
