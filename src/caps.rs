use crate::Color;
use std::collections::BTreeSet;

/// Capabilities reported by LED
///
/// Tokens are kept as strings so unknown tokens survive a round trip.
#[derive(Clone, Debug, Default, PartialEq, Eq, educe::Educe)]
#[educe(Deref)]
pub struct Capabilities {
    tokens: BTreeSet<String>,
}

impl Capabilities {
    /// Parse whitespace separated list of tokens
    pub fn parse(raw: &str) -> Self {
        raw.split_whitespace().collect()
    }

    /// Check that color is listed
    pub fn supports(&self, color: Color) -> bool {
        self.tokens.contains(color.to_string().as_str())
    }
}

impl core::fmt::Display for Capabilities {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let mut first = true;
        for token in &self.tokens {
            if !first {
                f.write_str(" ")?;
            }
            f.write_str(token)?;
            first = false;
        }
        Ok(())
    }
}

impl<'a> FromIterator<&'a str> for Capabilities {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().map(String::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_tokens() {
        let caps = Capabilities::parse(" green  red_blink\norange\n");
        assert_eq!(caps.len(), 3);
        assert!(caps.supports(Color::Green));
        assert!(caps.supports(Color::RedBlink));
        assert!(caps.supports(Color::Orange));
        assert!(!caps.supports(Color::Red));
        assert!(!caps.supports(Color::Off));
    }

    #[test]
    fn unknown_tokens_kept() {
        let caps = Capabilities::parse("green blue");
        assert!(caps.contains("blue"));
        assert_eq!(caps.to_string(), "blue green");
    }

    #[test]
    fn empty() {
        let caps = Capabilities::parse("");
        assert!(caps.is_empty());
        assert_eq!(caps.to_string(), "");
    }

    #[test]
    fn collect() {
        let caps: Capabilities = ["green", "green_blink"].into_iter().collect();
        assert!(caps.supports(Color::GreenBlink));
    }
}
