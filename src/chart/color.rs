//! Structured RGBA colours.
//!
//! Colours arrive as CSS-style strings (from config files and API bodies) and
//! are parsed once at the boundary. Everything downstream works on channels.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use std::fmt;
use std::str::FromStr;

/// Opacity of the area filled beneath a line.
pub const FILL_ALPHA: f64 = 0.1;

#[derive(Debug, Error, PartialEq)]
pub enum ColorError {
    #[error("unrecognised colour format: {0:?}")]
    Format(String),
    #[error("colour channel out of range in {0:?}")]
    Channel(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Same channels, different opacity. Alpha is clamped to `[0, 1]`.
    pub fn with_alpha(self, alpha: f64) -> Self {
        Self {
            a: alpha.clamp(0.0, 1.0),
            ..self
        }
    }

    /// The translucent colour used beneath a line of this colour.
    pub fn fill(self) -> Self {
        self.with_alpha(FILL_ALPHA)
    }
}

impl From<Rgba> for plotly::color::Rgba {
    fn from(color: Rgba) -> Self {
        plotly::color::Rgba::new(color.r, color.g, color.b, color.a)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

impl From<Rgba> for String {
    fn from(color: Rgba) -> Self {
        color.to_string()
    }
}

impl TryFrom<String> for Rgba {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for Rgba {
    type Err = ColorError;

    /// Accepts `rgba(r, g, b, a)`, `rgb(r, g, b)`, `#rgb`, `#rrggbb` and
    /// `#rrggbbaa`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        if let Some(hex) = trimmed.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| ColorError::Format(s.to_owned()));
        }

        let lower = trimmed.to_ascii_lowercase();
        let (args, with_alpha) = if let Some(rest) = lower.strip_prefix("rgba(") {
            (rest, true)
        } else if let Some(rest) = lower.strip_prefix("rgb(") {
            (rest, false)
        } else {
            return Err(ColorError::Format(s.to_owned()));
        };

        let args = args
            .strip_suffix(')')
            .ok_or_else(|| ColorError::Format(s.to_owned()))?;
        let parts: Vec<&str> = args.split(',').map(str::trim).collect();

        let expected = if with_alpha { 4 } else { 3 };
        if parts.len() != expected {
            return Err(ColorError::Format(s.to_owned()));
        }

        let channel = |part: &str| -> Result<u8, ColorError> {
            let value: f64 = part
                .parse()
                .map_err(|_| ColorError::Format(s.to_owned()))?;
            if !(0.0..=255.0).contains(&value) {
                return Err(ColorError::Channel(s.to_owned()));
            }
            Ok(value.round() as u8)
        };

        let alpha = match parts.get(3) {
            Some(part) => {
                let a: f64 = part
                    .parse()
                    .map_err(|_| ColorError::Format(s.to_owned()))?;
                if !(0.0..=1.0).contains(&a) {
                    return Err(ColorError::Channel(s.to_owned()));
                }
                a
            }
            None => 1.0,
        };

        Ok(Rgba::new(
            channel(parts[0])?,
            channel(parts[1])?,
            channel(parts[2])?,
            alpha,
        ))
    }
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let byte = |i: usize| -> Option<u8> { u8::from_str_radix(hex.get(i..i + 2)?, 16).ok() };
    let nibble = |i: usize| -> Option<u8> {
        let v = u8::from_str_radix(hex.get(i..i + 1)?, 16).ok()?;
        Some(v * 17)
    };

    match hex.len() {
        3 => Some(Rgba::opaque(nibble(0)?, nibble(1)?, nibble(2)?)),
        6 => Some(Rgba::opaque(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Rgba::new(
            byte(0)?,
            byte(2)?,
            byte(4)?,
            f64::from(byte(6)?) / 255.0,
        )),
        _ => None,
    }
}
