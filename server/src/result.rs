use crate::Color;

/// Unified result type
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] core::str::Utf8Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Capabilities of LED {id} unreadable: {source}")]
    CapabilityUnreadable {
        id: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Unable to write {attr}: {source}")]
    Write {
        attr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Unable to read {attr}: {source}")]
    Read {
        attr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("LED {id} does not support {color}")]
    UnsupportedColor { id: String, color: Color },
    #[error("Blink delays of LED {0} not ready")]
    BlinkNotReady(String),
    #[error("Color {0} cannot be arbitrated")]
    ArbitrationInvalidColor(Color),
    #[error("Unknown LED: {0}")]
    UnknownLed(String),
    #[error("Unknown fault: {0}")]
    UnknownFault(String),
    #[error("Other error: {0}")]
    Other(String),
}

impl AsRef<str> for Error {
    fn as_ref(&self) -> &str {
        match self {
            Error::Io(_) => "IO error",
            Error::Utf8(_) => "UTF-8 error",
            Error::Json(_) => "JSON error",
            Error::Toml(_) => "TOML error",
            Error::CapabilityUnreadable { .. } => "Capability error",
            Error::Write { .. } => "Write error",
            Error::Read { .. } => "Read error",
            Error::UnsupportedColor { .. } => "Unsupported color",
            Error::BlinkNotReady(_) => "Blink error",
            Error::ArbitrationInvalidColor(_) => "Arbitration error",
            Error::UnknownLed(_) => "Unknown LED",
            Error::UnknownFault(_) => "Unknown fault",
            Error::Other(_) => "Other error",
        }
    }
}

impl From<&str> for Error {
    fn from(error: &str) -> Self {
        Self::Other(error.into())
    }
}

impl From<String> for Error {
    fn from(error: String) -> Self {
        Self::Other(error)
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(error: tokio::task::JoinError) -> Self {
        Self::Other(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        let error = Error::UnsupportedColor {
            id: "fan1".into(),
            color: Color::RedBlink,
        };
        assert_eq!(error.as_ref(), "Unsupported color");
        assert_eq!(error.to_string(), "LED fan1 does not support red_blink");

        let error = Error::from("boom");
        assert_eq!(error.as_ref(), "Other error");
        assert_eq!(error.to_string(), "Other error: boom");
    }

    #[test]
    fn source_chain() {
        use std::error::Error as _;

        let error = Error::Read {
            attr: "led_fan1_green".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(error.source().unwrap().to_string().contains("missing"));
        assert_eq!(
            Error::ArbitrationInvalidColor(Color::Orange).to_string(),
            "Color orange cannot be arbitrated"
        );
    }
}
