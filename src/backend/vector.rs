//! Path-drawing backend built on [`kurbo`].
//!
//! The canvas keeps one open path plus a pen state (width, cap, colour).
//! `stroke` commits the open path with the current pen and starts a fresh one;
//! the committed strokes are what [`VectorCanvas::to_svg`] emits.

use std::{fmt::Write as _, path::Path};

use kurbo::{BezPath, Cap, Point, Stroke, Vec2};
use tracing::debug;

use crate::{
    color::{Rgba8, parse_color},
    command::CommandId,
    op::Operation,
    types::{Extent, MediaInfo, MediaKind},
};

use super::{Backend, BackendError, Effect, VectorBackend};

/// Default pen width for a new canvas.
pub const DEFAULT_LINE_WIDTH: f64 = 1.0;

/// Maps a cap name (`butt`, `round`, `square`) onto [`Cap`].
pub fn parse_cap(name: &str) -> Option<Cap> {
    match name.trim().to_ascii_lowercase().as_str() {
        "butt" => Some(Cap::Butt),
        "round" => Some(Cap::Round),
        "square" => Some(Cap::Square),
        _ => None,
    }
}

fn cap_name(cap: Cap) -> &'static str {
    match cap {
        Cap::Butt => "butt",
        Cap::Round => "round",
        Cap::Square => "square",
    }
}

/// A committed path with the pen it was stroked with.
#[derive(Debug, Clone)]
pub struct StrokedPath {
    /// Geometry.
    pub path: BezPath,
    /// Width and caps.
    pub style: Stroke,
    /// Stroke colour.
    pub color: Rgba8,
}

/// In-memory drawing surface.
#[derive(Debug, Clone)]
pub struct VectorCanvas {
    extent: Extent,
    path: BezPath,
    current: Option<Point>,
    subpath_start: Option<Point>,
    pen: Stroke,
    color: Rgba8,
    strokes: Vec<StrokedPath>,
}

impl VectorCanvas {
    /// Empty `width` x `height` canvas with a 1-unit black butt-capped pen.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            extent: Extent::new(width, height),
            path: BezPath::new(),
            current: None,
            subpath_start: None,
            pen: Stroke::new(DEFAULT_LINE_WIDTH).with_caps(Cap::Butt),
            color: Rgba8::BLACK,
            strokes: Vec::new(),
        }
    }

    /// Path under construction.
    pub fn path(&self) -> &BezPath {
        &self.path
    }

    /// Pen position, if a path has been started.
    pub fn current_point(&self) -> Option<Point> {
        self.current
    }

    /// Current pen.
    pub fn pen(&self) -> &Stroke {
        &self.pen
    }

    /// Current stroke colour.
    pub fn color(&self) -> Rgba8 {
        self.color
    }

    /// Strokes committed so far, oldest first.
    pub fn strokes(&self) -> &[StrokedPath] {
        &self.strokes
    }

    /// Committed strokes as a standalone SVG document.
    pub fn to_svg(&self) -> String {
        let (w, h) = (self.extent.width, self.extent.height);
        let mut out = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n"
        );
        for stroke in &self.strokes {
            let c = stroke.color;
            let _ = writeln!(
                out,
                "  <path d=\"{}\" fill=\"none\" stroke=\"#{:02x}{:02x}{:02x}\" stroke-opacity=\"{}\" stroke-width=\"{}\" stroke-linecap=\"{}\"/>",
                stroke.path.to_svg(),
                c.r,
                c.g,
                c.b,
                f64::from(c.a) / 255.0,
                stroke.style.width,
                cap_name(stroke.style.start_cap),
            );
        }
        out.push_str("</svg>\n");
        out
    }

    /// Writes [`Self::to_svg`] to `path`.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), BackendError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_svg())?;
        debug!(path = %path.display(), strokes = self.strokes.len(), "wrote svg");
        Ok(())
    }

    fn contains(&self, p: Point) -> bool {
        p.x >= 0.0
            && p.y >= 0.0
            && p.x <= f64::from(self.extent.width)
            && p.y <= f64::from(self.extent.height)
    }

    fn point_arg(op: &Operation) -> Result<Point, BackendError> {
        Ok(Point::new(f64::from(op.int(0)?), f64::from(op.int(1)?)))
    }

    fn current_or_err(&self, command: CommandId) -> Result<Point, BackendError> {
        self.current
            .ok_or_else(|| BackendError::effect(command, "no current point"))
    }

    fn inside_or_err(&self, command: CommandId, p: Point) -> Result<Point, BackendError> {
        if !self.contains(p) {
            return Err(BackendError::effect(
                command,
                format!("point ({}, {}) lies outside the {} canvas", p.x, p.y, self.extent),
            ));
        }
        Ok(p)
    }

    fn relative_target(&self, op: &Operation) -> Result<Point, BackendError> {
        let command = op.command();
        let from = self.current_or_err(command)?;
        let delta = Vec2::new(f64::from(op.int(0)?), f64::from(op.int(1)?));
        self.inside_or_err(command, from + delta)
    }
}

impl Backend for VectorCanvas {
    const MEDIA: MediaKind = MediaKind::Vector;

    fn extent(&self) -> Extent {
        self.extent
    }

    fn info(&self) -> MediaInfo {
        MediaInfo {
            width: self.extent.width,
            height: self.extent.height,
            format: Some("svg".to_string()),
            path: None,
            colors: None,
        }
    }

    fn apply(&mut self, op: &Operation) -> Result<Effect, BackendError> {
        let command = op.command();
        match command {
            CommandId::OpenPath => {
                self.path = BezPath::new();
                self.current = None;
                self.subpath_start = None;
            }
            CommandId::MoveTo => {
                let p = self.inside_or_err(command, Self::point_arg(op)?)?;
                self.path = BezPath::new();
                self.path.move_to(p);
                self.current = Some(p);
                self.subpath_start = Some(p);
            }
            CommandId::LineTo => {
                self.current_or_err(command)?;
                let p = self.inside_or_err(command, Self::point_arg(op)?)?;
                self.path.line_to(p);
                self.current = Some(p);
            }
            CommandId::RelMoveTo => {
                if op.int(0)? == 0 && op.int(1)? == 0 {
                    return Ok(Effect::Skipped);
                }
                let p = self.relative_target(op)?;
                self.path.move_to(p);
                self.current = Some(p);
                self.subpath_start = Some(p);
            }
            CommandId::RelLineTo => {
                let p = self.relative_target(op)?;
                self.path.line_to(p);
                self.current = Some(p);
            }
            CommandId::ClosePath => {
                self.current_or_err(command)?;
                self.path.close_path();
                self.current = self.subpath_start;
            }
            CommandId::SetCap => {
                let name = op.text(0)?;
                let cap = parse_cap(name)
                    .ok_or_else(|| BackendError::effect(command, format!("unknown line cap \"{name}\"")))?;
                self.pen = self.pen.clone().with_caps(cap);
            }
            CommandId::SetColor => {
                self.color = parse_color(op.text(0)?)?;
            }
            CommandId::SetWidth => {
                let width = f64::from(op.uint(0)?);
                if width <= 0.0 {
                    return Err(BackendError::effect(command, "line width must be greater than zero"));
                }
                self.pen.width = width;
            }
            CommandId::Stroke => {
                if self.path.segments().next().is_none() {
                    return Ok(Effect::Skipped);
                }
                self.strokes.push(StrokedPath {
                    path: std::mem::take(&mut self.path),
                    style: self.pen.clone(),
                    color: self.color,
                });
                self.current = None;
                self.subpath_start = None;
            }
            _ => {
                return Err(BackendError::Unsupported {
                    command,
                    media: MediaKind::Vector,
                });
            }
        }
        Ok(Effect::Applied)
    }
}

impl VectorBackend for VectorCanvas {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cap_names_round_trip() {
        for cap in [Cap::Butt, Cap::Round, Cap::Square] {
            assert_eq!(parse_cap(cap_name(cap)), Some(cap));
        }
        assert_eq!(parse_cap("miter"), None);
    }

    #[test]
    fn lineto_needs_current_point() {
        let mut canvas = VectorCanvas::new(10, 10);
        let op = Operation::with_args(CommandId::LineTo, [1i32.into(), 1i32.into()]).unwrap();
        assert!(matches!(canvas.apply(&op), Err(BackendError::Effect { .. })));
    }
}
