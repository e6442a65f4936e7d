//! Colour strings used by border, rotate, tint, and setcolor.

use std::{fmt, str::FromStr};

use serde::Serialize;

/// Straight-alpha RGBA8 colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rgba8 {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha, 255 is opaque.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// Opaque colour from three channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Channels in `[r, g, b, a]` order.
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl fmt::Display for Rgba8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

/// Text that is neither a known name nor a hex colour.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid colour \"{input}\": {reason}")]
pub struct ColorError {
    /// Rejected input.
    pub input: String,
    /// What was wrong with it.
    pub reason: String,
}

impl FromStr for Rgba8 {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_color(s)
    }
}

/// Parses `#RGB`, `#RRGGBB`, `#RRGGBBAA`, or one of a handful of names.
pub fn parse_color(input: &str) -> Result<Rgba8, ColorError> {
    let s = input.trim();
    if let Some(named) = named_color(s) {
        return Ok(named);
    }

    let err = |reason: &str| ColorError {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let Some(hex) = s.strip_prefix('#') else {
        return Err(err("expected a colour name or #hex"));
    };
    if !hex.is_ascii() {
        return Err(err("non-ascii hex digits"));
    }

    let byte = |pair: &str| u8::from_str_radix(pair, 16).map_err(|_| err("invalid hex digit"));
    let nibble = |c: &str| byte(c).map(|v| v * 17);

    match hex.len() {
        3 => Ok(Rgba8::rgb(
            nibble(&hex[0..1])?,
            nibble(&hex[1..2])?,
            nibble(&hex[2..3])?,
        )),
        6 => Ok(Rgba8::rgb(
            byte(&hex[0..2])?,
            byte(&hex[2..4])?,
            byte(&hex[4..6])?,
        )),
        8 => Ok(Rgba8 {
            r: byte(&hex[0..2])?,
            g: byte(&hex[2..4])?,
            b: byte(&hex[4..6])?,
            a: byte(&hex[6..8])?,
        }),
        _ => Err(err("hex colour must be #RGB, #RRGGBB or #RRGGBBAA")),
    }
}

fn named_color(s: &str) -> Option<Rgba8> {
    let c = match s.to_ascii_lowercase().as_str() {
        "black" => Rgba8::BLACK,
        "white" => Rgba8::rgb(255, 255, 255),
        "red" => Rgba8::rgb(255, 0, 0),
        "green" => Rgba8::rgb(0, 128, 0),
        "lime" => Rgba8::rgb(0, 255, 0),
        "blue" => Rgba8::rgb(0, 0, 255),
        "yellow" => Rgba8::rgb(255, 255, 0),
        "cyan" => Rgba8::rgb(0, 255, 255),
        "magenta" => Rgba8::rgb(255, 0, 255),
        "gray" | "grey" => Rgba8::rgb(128, 128, 128),
        "transparent" | "none" => Rgba8 {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        },
        _ => return None,
    };
    Some(c)
}
