//! One typed recording method per catalog command.
//!
//! Each method builds the operation from its arguments and goes through
//! [`Document::record`], so the same validation applies either way.

use crate::{
    backend::{RasterBackend, VectorBackend},
    command::CommandId,
    types::OpIndex,
};

use super::{Document, RecordError};

/// Background used by [`Document::rotate`].
pub const DEFAULT_ROTATE_BACKGROUND: &str = "#000000";

impl<B: RasterBackend> Document<B> {
    /// Surrounds the image with a `width` x `height` frame of `color`.
    pub fn border(&mut self, width: u32, height: u32, color: &str) -> Result<OpIndex, RecordError> {
        self.record_args(CommandId::Border, [width.into(), height.into(), color.into()])
    }

    /// Brightens or darkens by `value` percent, within `[-100, 100]`.
    pub fn brightness(&mut self, value: f64) -> Result<OpIndex, RecordError> {
        self.record_args(CommandId::Brightness, [value.into()])
    }

    /// Charcoal sketch effect.
    pub fn charcoal(&mut self, amount: f64) -> Result<OpIndex, RecordError> {
        self.record_args(CommandId::Charcoal, [amount.into()])
    }

    /// Keeps the `width` x `height` region at `(x, y)`.
    ///
    /// The region must fit inside the extent left by earlier operations.
    pub fn crop(&mut self, x: u32, y: u32, width: u32, height: u32) -> Result<OpIndex, RecordError> {
        self.record_args(
            CommandId::Crop,
            [x.into(), y.into(), width.into(), height.into()],
        )
    }

    /// Noise reduction.
    pub fn despeckle(&mut self) -> Result<OpIndex, RecordError> {
        self.record_args(CommandId::Despeckle, [])
    }

    /// Edge detection.
    pub fn edge(&mut self, amount: f64) -> Result<OpIndex, RecordError> {
        self.record_args(CommandId::Edge, [amount.into()])
    }

    /// Relief effect.
    pub fn emboss(&mut self, amount: f64) -> Result<OpIndex, RecordError> {
        self.record_args(CommandId::Emboss, [amount.into()])
    }

    /// Histogram equalisation.
    pub fn equalize(&mut self) -> Result<OpIndex, RecordError> {
        self.record_args(CommandId::Equalize, [])
    }

    /// Gamma correction; `gamma` must be positive.
    pub fn gamma(&mut self, gamma: f64) -> Result<OpIndex, RecordError> {
        self.record_args(CommandId::Gamma, [gamma.into()])
    }

    /// Gaussian blur with standard deviation `amount`.
    pub fn gaussian_blur(&mut self, amount: f64) -> Result<OpIndex, RecordError> {
        self.record_args(CommandId::GaussianBlur, [amount.into()])
    }

    /// Mirrors left to right.
    pub fn horizontal_flip(&mut self) -> Result<OpIndex, RecordError> {
        self.record_args(CommandId::HorizontalFlip, [])
    }

    /// Hue shift by `value` percent of a half turn, within `[-100, 100]`.
    pub fn hue(&mut self, value: f64) -> Result<OpIndex, RecordError> {
        self.record_args(CommandId::Hue, [value.into()])
    }

    /// Implosion toward the centre.
    pub fn implode(&mut self, amount: f64) -> Result<OpIndex, RecordError> {
        self.record_args(CommandId::Implode, [amount.into()])
    }

    /// Remaps `black`..`white` (percent) onto the full range with `gamma`.
    pub fn levels(&mut self, black: f64, white: f64, gamma: f64) -> Result<OpIndex, RecordError> {
        self.record_args(CommandId::Levels, [black.into(), white.into(), gamma.into()])
    }

    /// Directional blur.
    pub fn motion_blur(&mut self, amount: f64, angle: f64) -> Result<OpIndex, RecordError> {
        self.record_args(CommandId::MotionBlur, [amount.into(), angle.into()])
    }

    /// Inverts every colour channel.
    pub fn negate(&mut self) -> Result<OpIndex, RecordError> {
        self.record_args(CommandId::Negate, [])
    }

    /// Inverts only grey pixels.
    pub fn negate_grays(&mut self) -> Result<OpIndex, RecordError> {
        self.record_args(CommandId::NegateGrays, [])
    }

    /// Stretches contrast to the full range.
    pub fn normalize(&mut self) -> Result<OpIndex, RecordError> {
        self.record_args(CommandId::Normalize, [])
    }

    /// Oil-painting effect.
    pub fn oil_paint(&mut self, radius: f64) -> Result<OpIndex, RecordError> {
        self.record_args(CommandId::OilPaint, [radius.into()])
    }

    /// Rotational blur.
    pub fn radial_blur(&mut self, angle: f64) -> Result<OpIndex, RecordError> {
        self.record_args(CommandId::RadialBlur, [angle.into()])
    }

    /// Resamples to exactly `width` x `height`.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<OpIndex, RecordError> {
        self.record_args(CommandId::Resize, [width.into(), height.into()])
    }

    /// Shifts pixels with wrap-around.
    pub fn roll(&mut self, dx: i32, dy: i32) -> Result<OpIndex, RecordError> {
        self.record_args(CommandId::Roll, [dx.into(), dy.into()])
    }

    /// Rotates clockwise by `angle` degrees over a black background.
    pub fn rotate(&mut self, angle: f64) -> Result<OpIndex, RecordError> {
        self.rotate_with_background(angle, DEFAULT_ROTATE_BACKGROUND)
    }

    /// Rotates clockwise by `angle` degrees, filling exposed corners with `background`.
    pub fn rotate_with_background(&mut self, angle: f64, background: &str) -> Result<OpIndex, RecordError> {
        self.record_args(CommandId::Rotate, [angle.into(), background.into()])
    }

    /// Saturation change in percent, within `[-100, 100]`.
    pub fn saturation(&mut self, value: f64) -> Result<OpIndex, RecordError> {
        self.record_args(CommandId::Saturation, [value.into()])
    }

    /// Multiplies both sides by `factor`.
    pub fn scale(&mut self, factor: f64) -> Result<OpIndex, RecordError> {
        self.record_args(CommandId::Scale, [factor.into()])
    }

    /// Unsharp mask with standard deviation `amount`.
    pub fn sharpen(&mut self, amount: f64) -> Result<OpIndex, RecordError> {
        self.record_args(CommandId::Sharpen, [amount.into()])
    }

    /// Swirl around the centre.
    pub fn swirl(&mut self, degrees: f64) -> Result<OpIndex, RecordError> {
        self.record_args(CommandId::Swirl, [degrees.into()])
    }

    /// Blends toward `color` by `opacity` in `[0, 1]`.
    pub fn tint(&mut self, color: &str, opacity: f64) -> Result<OpIndex, RecordError> {
        self.record_args(CommandId::Tint, [color.into(), opacity.into()])
    }

    /// Mirrors top to bottom.
    pub fn vertical_flip(&mut self) -> Result<OpIndex, RecordError> {
        self.record_args(CommandId::VerticalFlip, [])
    }

    /// Sine-wave displacement.
    pub fn wave(&mut self, amplitude: f64, wavelength: f64) -> Result<OpIndex, RecordError> {
        self.record_args(CommandId::Wave, [amplitude.into(), wavelength.into()])
    }
}

impl<B: VectorBackend> Document<B> {
    /// Closes the current subpath.
    pub fn close_path(&mut self) -> Result<OpIndex, RecordError> {
        self.record_args(CommandId::ClosePath, [])
    }

    /// Straight line to `(x, y)`.
    pub fn line_to(&mut self, x: i32, y: i32) -> Result<OpIndex, RecordError> {
        self.record_args(CommandId::LineTo, [x.into(), y.into()])
    }

    /// Starts a fresh path at `(x, y)`.
    pub fn move_to(&mut self, x: i32, y: i32) -> Result<OpIndex, RecordError> {
        self.record_args(CommandId::MoveTo, [x.into(), y.into()])
    }

    /// Discards the current path.
    pub fn open_path(&mut self) -> Result<OpIndex, RecordError> {
        self.record_args(CommandId::OpenPath, [])
    }

    /// Line by `(dx, dy)` from the current point.
    pub fn rel_line_to(&mut self, dx: i32, dy: i32) -> Result<OpIndex, RecordError> {
        self.record_args(CommandId::RelLineTo, [dx.into(), dy.into()])
    }

    /// New subpath offset by `(dx, dy)` from the current point.
    pub fn rel_move_to(&mut self, dx: i32, dy: i32) -> Result<OpIndex, RecordError> {
        self.record_args(CommandId::RelMoveTo, [dx.into(), dy.into()])
    }

    /// Line cap: `butt`, `round`, or `square`.
    pub fn set_cap(&mut self, cap: &str) -> Result<OpIndex, RecordError> {
        self.record_args(CommandId::SetCap, [cap.into()])
    }

    /// Stroke colour for later strokes.
    pub fn set_color(&mut self, color: &str) -> Result<OpIndex, RecordError> {
        self.record_args(CommandId::SetColor, [color.into()])
    }

    /// Stroke width for later strokes.
    pub fn set_width(&mut self, width: u32) -> Result<OpIndex, RecordError> {
        self.record_args(CommandId::SetWidth, [width.into()])
    }

    /// Commits the current path.
    pub fn stroke(&mut self) -> Result<OpIndex, RecordError> {
        self.record_args(CommandId::Stroke, [])
    }
}
