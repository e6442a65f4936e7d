//! Argument rules, identity detection, and extent projection per command.
//!
//! Callers run [`Operation::check_schema`] first; the accessors used here still
//! report a mismatch instead of panicking if they do not.

use std::fmt;

use crate::{
    backend::vector::parse_cap,
    color::{ColorError, parse_color},
    command::CommandId,
    op::{Arg, ArgError, Operation},
    types::{Extent, MAX_PIXELS},
};

/// Human-readable reason an operation was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reason(pub String);

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ArgError> for Reason {
    fn from(value: ArgError) -> Self {
        Self(value.to_string())
    }
}

impl From<ColorError> for Reason {
    fn from(value: ColorError) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Reason {
    fn from(value: String) -> Self {
        Self(value)
    }
}

fn in_range(value: f64, min: f64, max: f64) -> Result<(), Reason> {
    if value < min || value > max {
        return Err(format!("value {value} is outside acceptable range [{min}, {max}]").into());
    }
    Ok(())
}

fn non_negative(value: f64) -> Result<(), Reason> {
    if value < 0.0 {
        return Err(format!("value {value} must not be negative").into());
    }
    Ok(())
}

fn positive(value: f64) -> Result<(), Reason> {
    if value <= 0.0 {
        return Err(format!("value {value} must be greater than zero").into());
    }
    Ok(())
}

/// Range and format rules that do not depend on document state.
pub fn check_domain(op: &Operation) -> Result<(), Reason> {
    for (index, arg) in op.args().iter().enumerate() {
        if matches!(arg, Arg::Double(v) if !v.is_finite()) {
            return Err(format!("argument {index} must be finite").into());
        }
    }

    match op.command() {
        CommandId::Brightness | CommandId::Hue | CommandId::Saturation => {
            in_range(op.double(0)?, -100.0, 100.0)
        }
        CommandId::Charcoal
        | CommandId::Edge
        | CommandId::Emboss
        | CommandId::GaussianBlur
        | CommandId::MotionBlur
        | CommandId::OilPaint
        | CommandId::Sharpen => non_negative(op.double(0)?),
        CommandId::Wave => {
            non_negative(op.double(0)?)?;
            positive(op.double(1)?)
        }
        CommandId::Gamma | CommandId::Scale => positive(op.double(0)?),
        CommandId::Levels => {
            let (black, white, gamma) = (op.double(0)?, op.double(1)?, op.double(2)?);
            in_range(black, 0.0, 100.0)?;
            in_range(white, 0.0, 100.0)?;
            if black >= white {
                return Err(format!("black point {black} must be below white point {white}").into());
            }
            positive(gamma)
        }
        CommandId::Resize => {
            let (width, height) = (op.uint(0)?, op.uint(1)?);
            if width == 0 || height == 0 {
                return Err(format!("cannot resize to {width}x{height}").into());
            }
            Ok(())
        }
        CommandId::Border => parse_color(op.text(2)?).map(drop).map_err(Reason::from),
        CommandId::Rotate => parse_color(op.text(1)?).map(drop).map_err(Reason::from),
        CommandId::Tint => {
            parse_color(op.text(0)?)?;
            in_range(op.double(1)?, 0.0, 1.0)
        }
        CommandId::SetColor => parse_color(op.text(0)?).map(drop).map_err(Reason::from),
        CommandId::SetCap => {
            let name = op.text(0)?;
            parse_cap(name)
                .map(drop)
                .ok_or_else(|| format!("unknown line cap \"{name}\"").into())
        }
        CommandId::SetWidth => {
            if op.uint(0)? == 0 {
                return Err(Reason("line width must be greater than zero".to_string()));
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Rules that read the document's current extent.
///
/// Returns the extent the document has once `op` is applied.
pub fn check_state(op: &Operation, extent: Extent) -> Result<Extent, Reason> {
    match op.command() {
        CommandId::Crop => {
            let (width, height) = (op.uint(2)?, op.uint(3)?);
            if width > extent.width {
                return Err(format!(
                    "requested width {width} is greater than current width {}",
                    extent.width
                )
                .into());
            }
            if height > extent.height {
                return Err(format!(
                    "requested height {height} is greater than current height {}",
                    extent.height
                )
                .into());
            }
        }
        CommandId::Scale => {
            let factor = op.double(0)?;
            match scaled_extent(extent, factor) {
                Some(scaled) if scaled.is_empty() => {
                    return Err(
                        format!("scaling {extent} would leave an empty image ({scaled})").into()
                    );
                }
                Some(_) => {}
                None => {
                    return Err(format!("scaling {extent} by {factor} overflows").into());
                }
            }
        }
        CommandId::MoveTo | CommandId::LineTo => {
            let (x, y) = (op.int(0)?, op.int(1)?);
            let inside = x >= 0
                && y >= 0
                && i64::from(x) <= i64::from(extent.width)
                && i64::from(y) <= i64::from(extent.height);
            if !inside {
                return Err(format!("point ({x}, {y}) lies outside the {extent} canvas").into());
            }
        }
        _ => {}
    }

    let next = project(op, extent)?
        .ok_or_else(|| Reason(format!("resulting size overflows a {extent} image")))?;
    if next != extent && !next.within_budget() {
        return Err(format!(
            "resulting {next} image exceeds the {MAX_PIXELS} pixel limit"
        )
        .into());
    }
    Ok(next)
}

/// True when applying `op` to a document of size `extent` changes nothing.
pub fn is_identity(op: &Operation, extent: Extent) -> bool {
    identity(op, extent).unwrap_or(false)
}

fn identity(op: &Operation, extent: Extent) -> Result<bool, ArgError> {
    let same = match op.command() {
        CommandId::Border => op.uint(0)? == 0 && op.uint(1)? == 0,
        CommandId::Brightness
        | CommandId::Hue
        | CommandId::Saturation
        | CommandId::Charcoal
        | CommandId::Emboss
        | CommandId::GaussianBlur
        | CommandId::Sharpen
        | CommandId::Swirl
        | CommandId::Implode
        | CommandId::RadialBlur
        | CommandId::MotionBlur
        | CommandId::Wave => op.double(0)? == 0.0,
        CommandId::Tint => op.double(1)? == 0.0,
        CommandId::Gamma | CommandId::Scale => op.double(0)? == 1.0,
        CommandId::Levels => {
            op.double(0)? == 0.0 && op.double(1)? == 100.0 && op.double(2)? == 1.0
        }
        CommandId::Crop => {
            op.uint(0)? == 0
                && op.uint(1)? == 0
                && op.uint(2)? == extent.width
                && op.uint(3)? == extent.height
        }
        CommandId::Resize => op.uint(0)? == extent.width && op.uint(1)? == extent.height,
        CommandId::Roll => {
            wraps(op.int(0)?, extent.width) && wraps(op.int(1)?, extent.height)
        }
        CommandId::Rotate => op.double(0)?.rem_euclid(360.0) == 0.0,
        _ => false,
    };
    Ok(same)
}

fn wraps(amount: i32, side: u32) -> bool {
    side == 0 || i64::from(amount).rem_euclid(i64::from(side)) == 0
}

/// Extent after applying `op` to a document of size `extent`, or `None` when
/// a side would not fit in `u32`.
pub fn project_extent(op: &Operation, extent: Extent) -> Option<Extent> {
    project(op, extent).unwrap_or(Some(extent))
}

fn project(op: &Operation, extent: Extent) -> Result<Option<Extent>, ArgError> {
    let next = match op.command() {
        CommandId::Crop => {
            let (x, y) = (op.uint(0)?, op.uint(1)?);
            Some(Extent::new(
                op.uint(2)?.min(extent.width.saturating_sub(x)),
                op.uint(3)?.min(extent.height.saturating_sub(y)),
            ))
        }
        CommandId::Resize => Some(Extent::new(op.uint(0)?, op.uint(1)?)),
        CommandId::Scale => scaled_extent(extent, op.double(0)?),
        CommandId::Rotate => Some(rotated_extent(extent, op.double(0)?)),
        CommandId::Border => {
            let (bw, bh) = (op.uint(0)?, op.uint(1)?);
            bordered_extent(extent, bw, bh)
        }
        CommandId::Wave => waved_extent(extent, op.double(0)?),
        _ => Some(extent),
    };
    Ok(next)
}

/// Size after scaling both sides by `factor`, truncating toward zero.
pub fn scaled_extent(extent: Extent, factor: f64) -> Option<Extent> {
    Some(Extent::new(
        side(f64::from(extent.width) * factor)?,
        side(f64::from(extent.height) * factor)?,
    ))
}

fn side(value: f64) -> Option<u32> {
    (value.is_finite() && value >= 0.0 && value < 4_294_967_296.0).then(|| value as u32)
}

fn bordered_extent(extent: Extent, bw: u32, bh: u32) -> Option<Extent> {
    Some(Extent::new(
        extent.width.checked_add(bw.checked_mul(2)?)?,
        extent.height.checked_add(bh.checked_mul(2)?)?,
    ))
}

/// Size after a sine wave of `amplitude` pixels: taller by a whole crest and trough.
pub fn waved_extent(extent: Extent, amplitude: f64) -> Option<Extent> {
    let grow = side(2.0 * amplitude.ceil())?;
    Some(Extent::new(extent.width, extent.height.checked_add(grow)?))
}

/// Bounding box of `extent` rotated by `angle` degrees.
///
/// Right angles are exact; other angles round the box up to whole pixels.
pub fn rotated_extent(extent: Extent, angle: f64) -> Extent {
    let turn = angle.rem_euclid(360.0);
    if turn == 0.0 || turn == 180.0 {
        return extent;
    }
    if turn == 90.0 || turn == 270.0 {
        return Extent::new(extent.height, extent.width);
    }

    let (sin, cos) = turn.to_radians().sin_cos();
    let (w, h) = (f64::from(extent.width), f64::from(extent.height));
    let width = (w * cos.abs() + h * sin.abs() - 1e-9).ceil().max(0.0);
    let height = (w * sin.abs() + h * cos.abs() - 1e-9).ceil().max(0.0);
    Extent::new(width as u32, height as u32)
}
