//! Closed command catalog: identifiers, external names, and argument schemas.

use std::{fmt, str::FromStr, sync::LazyLock};

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::types::MediaKind;

/// Kind of a positional argument expected by a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArgKind {
    /// Unsigned 32-bit integer.
    Uint,
    /// Signed 32-bit integer.
    Int,
    /// Finite double.
    Double,
    /// Text, such as a colour or cap name.
    Text,
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Uint => "uint",
            Self::Int => "int",
            Self::Double => "double",
            Self::Text => "text",
        };
        f.write_str(s)
    }
}

/// Every command a document can record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum CommandId {
    // Raster
    Border,
    Brightness,
    Charcoal,
    Crop,
    Despeckle,
    Edge,
    Emboss,
    Equalize,
    Gamma,
    GaussianBlur,
    HorizontalFlip,
    Hue,
    Implode,
    Levels,
    MotionBlur,
    Negate,
    NegateGrays,
    Normalize,
    OilPaint,
    RadialBlur,
    Resize,
    Roll,
    Rotate,
    Saturation,
    Scale,
    Sharpen,
    Swirl,
    Tint,
    VerticalFlip,
    Wave,
    // Vector
    ClosePath,
    LineTo,
    MoveTo,
    OpenPath,
    RelLineTo,
    RelMoveTo,
    SetCap,
    SetColor,
    SetWidth,
    Stroke,
}

/// Catalog rows in declaration order.
pub const ALL_COMMANDS: &[CommandId] = &[
    CommandId::Border,
    CommandId::Brightness,
    CommandId::Charcoal,
    CommandId::Crop,
    CommandId::Despeckle,
    CommandId::Edge,
    CommandId::Emboss,
    CommandId::Equalize,
    CommandId::Gamma,
    CommandId::GaussianBlur,
    CommandId::HorizontalFlip,
    CommandId::Hue,
    CommandId::Implode,
    CommandId::Levels,
    CommandId::MotionBlur,
    CommandId::Negate,
    CommandId::NegateGrays,
    CommandId::Normalize,
    CommandId::OilPaint,
    CommandId::RadialBlur,
    CommandId::Resize,
    CommandId::Roll,
    CommandId::Rotate,
    CommandId::Saturation,
    CommandId::Scale,
    CommandId::Sharpen,
    CommandId::Swirl,
    CommandId::Tint,
    CommandId::VerticalFlip,
    CommandId::Wave,
    CommandId::ClosePath,
    CommandId::LineTo,
    CommandId::MoveTo,
    CommandId::OpenPath,
    CommandId::RelLineTo,
    CommandId::RelMoveTo,
    CommandId::SetCap,
    CommandId::SetColor,
    CommandId::SetWidth,
    CommandId::Stroke,
];

static BY_NAME: LazyLock<HashMap<&'static str, CommandId>> = LazyLock::new(|| {
    ALL_COMMANDS
        .iter()
        .map(|&command| (command.name(), command))
        .collect()
});

use ArgKind::{Double, Int, Text, Uint};

impl CommandId {
    /// External lowercase name used on the wire.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Border => "border",
            Self::Brightness => "brightness",
            Self::Charcoal => "charcoal",
            Self::Crop => "crop",
            Self::Despeckle => "despeckle",
            Self::Edge => "edge",
            Self::Emboss => "emboss",
            Self::Equalize => "equalize",
            Self::Gamma => "gamma",
            Self::GaussianBlur => "gaussianblur",
            Self::HorizontalFlip => "horizontalflip",
            Self::Hue => "hue",
            Self::Implode => "implode",
            Self::Levels => "levels",
            Self::MotionBlur => "motionblur",
            Self::Negate => "negate",
            Self::NegateGrays => "negategrays",
            Self::Normalize => "normalize",
            Self::OilPaint => "oilpaint",
            Self::RadialBlur => "radialblur",
            Self::Resize => "resize",
            Self::Roll => "roll",
            Self::Rotate => "rotate",
            Self::Saturation => "saturation",
            Self::Scale => "scale",
            Self::Sharpen => "sharpen",
            Self::Swirl => "swirl",
            Self::Tint => "tint",
            Self::VerticalFlip => "verticalflip",
            Self::Wave => "wave",
            Self::ClosePath => "closepath",
            Self::LineTo => "lineto",
            Self::MoveTo => "moveto",
            Self::OpenPath => "openpath",
            Self::RelLineTo => "rellineto",
            Self::RelMoveTo => "relmoveto",
            Self::SetCap => "setcap",
            Self::SetColor => "setcolor",
            Self::SetWidth => "setwidth",
            Self::Stroke => "stroke",
        }
    }

    /// Case-insensitive lookup; `None` for anything outside the catalog.
    pub fn from_name(name: &str) -> Option<Self> {
        if let Some(command) = BY_NAME.get(name) {
            return Some(*command);
        }
        BY_NAME.get(name.to_ascii_lowercase().as_str()).copied()
    }

    /// Media this command applies to.
    pub const fn media(self) -> MediaKind {
        match self {
            Self::ClosePath
            | Self::LineTo
            | Self::MoveTo
            | Self::OpenPath
            | Self::RelLineTo
            | Self::RelMoveTo
            | Self::SetCap
            | Self::SetColor
            | Self::SetWidth
            | Self::Stroke => MediaKind::Vector,
            _ => MediaKind::Raster,
        }
    }

    /// Positional argument kinds, in order.
    pub const fn schema(self) -> &'static [ArgKind] {
        match self {
            Self::Border => &[Uint, Uint, Text],
            Self::Crop => &[Uint, Uint, Uint, Uint],
            Self::Resize => &[Uint, Uint],
            Self::Roll => &[Int, Int],
            Self::Rotate => &[Double, Text],
            Self::Tint => &[Text, Double],
            Self::Levels => &[Double, Double, Double],
            Self::MotionBlur | Self::Wave => &[Double, Double],
            Self::Brightness
            | Self::Charcoal
            | Self::Edge
            | Self::Emboss
            | Self::Gamma
            | Self::GaussianBlur
            | Self::Hue
            | Self::Implode
            | Self::OilPaint
            | Self::RadialBlur
            | Self::Saturation
            | Self::Scale
            | Self::Sharpen
            | Self::Swirl => &[Double],
            Self::Despeckle
            | Self::Equalize
            | Self::HorizontalFlip
            | Self::Negate
            | Self::NegateGrays
            | Self::Normalize
            | Self::VerticalFlip => &[],
            Self::LineTo | Self::MoveTo | Self::RelLineTo | Self::RelMoveTo => &[Int, Int],
            Self::SetCap | Self::SetColor => &[Text],
            Self::SetWidth => &[Uint],
            Self::ClosePath | Self::OpenPath | Self::Stroke => &[],
        }
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned by [`CommandId::from_str`] for names outside the catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown command \"{0}\"")]
pub struct UnknownCommand(pub String);

impl FromStr for CommandId {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| UnknownCommand(s.to_string()))
    }
}

impl Serialize for CommandId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for CommandId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}
