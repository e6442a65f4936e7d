//! Pixel backend over [`image::DynamicImage`].

use std::path::{Path, PathBuf};

use hashbrown::HashSet;

use image::{
    DynamicImage, ImageFormat, ImageReader, Rgba, RgbaImage,
    imageops::{self, FilterType},
};
use tracing::debug;

use crate::{
    color::{Rgba8, parse_color},
    command::CommandId,
    document::validate::{is_identity, project_extent, rotated_extent, scaled_extent},
    op::Operation,
    types::{Extent, MAX_PIXELS, MediaInfo, MediaKind},
};

use super::{Backend, BackendError, Effect, RasterBackend, effects};

const EDGE_KERNEL: [f32; 9] = [-1.0, -1.0, -1.0, -1.0, 8.0, -1.0, -1.0, -1.0, -1.0];
const EMBOSS_KERNEL: [f32; 9] = [-2.0, -1.0, 0.0, -1.0, 1.0, 1.0, 0.0, 1.0, 2.0];

/// Decoded image plus where it came from.
#[derive(Debug, Clone)]
pub struct RasterImage {
    image: DynamicImage,
    format: Option<ImageFormat>,
    path: Option<PathBuf>,
}

impl RasterImage {
    /// Decodes the file at `path`, sniffing the format from its contents.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, BackendError> {
        let path = path.as_ref();
        let reader = ImageReader::open(path)?.with_guessed_format()?;
        let format = reader.format();
        let image = reader.decode()?;
        debug!(
            path = %path.display(),
            width = image.width(),
            height = image.height(),
            "opened raster image"
        );
        Ok(Self {
            image,
            format,
            path: Some(path.to_path_buf()),
        })
    }

    /// Wraps an in-memory image.
    pub fn from_image(image: DynamicImage) -> Self {
        Self {
            image,
            format: None,
            path: None,
        }
    }

    /// Solid `width` x `height` image filled with `color`.
    pub fn blank(width: u32, height: u32, color: Rgba8) -> Self {
        let buf = RgbaImage::from_pixel(width, height, Rgba(color.to_array()));
        Self::from_image(DynamicImage::ImageRgba8(buf))
    }

    /// Current pixels.
    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// Consumes the backend, returning its pixels.
    pub fn into_image(self) -> DynamicImage {
        self.image
    }

    /// Encodes the current pixels to `path`; the format follows the extension.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), BackendError> {
        self.image.save(path.as_ref())?;
        Ok(())
    }

    fn next_image(&self, op: &Operation) -> Result<DynamicImage, BackendError> {
        let img = &self.image;
        let command = op.command();
        let next = match command {
            CommandId::Border => {
                let color = parse_color(op.text(2)?)?;
                border(img, op.uint(0)?, op.uint(1)?, color)
                    .ok_or_else(|| BackendError::effect(command, "bordered image is too large"))?
            }
            CommandId::Brightness => {
                let factor = (100.0 + op.double(0)?) / 100.0;
                map_rgb(img, &table(|v| v * factor))
            }
            CommandId::Charcoal => charcoal(img, op.double(0)?),
            CommandId::Crop => {
                let (x, y, w, h) = (op.uint(0)?, op.uint(1)?, op.uint(2)?, op.uint(3)?);
                if w > img.width() || h > img.height() {
                    return Err(BackendError::effect(
                        command,
                        format!("{w}x{h} does not fit inside {}x{}", img.width(), img.height()),
                    ));
                }
                img.crop_imm(x, y, w, h)
            }
            CommandId::Despeckle => effects::despeckle(img),
            CommandId::Edge => convolve(img, &EDGE_KERNEL),
            CommandId::Emboss => convolve(img, &EMBOSS_KERNEL),
            CommandId::Equalize => effects::equalize(img),
            CommandId::Gamma => {
                let exponent = 1.0 / op.double(0)?;
                map_rgb(img, &table(|v| 255.0 * (v / 255.0).powf(exponent)))
            }
            CommandId::GaussianBlur => img.blur(op.double(0)? as f32),
            CommandId::HorizontalFlip => img.fliph(),
            CommandId::Hue => img.huerotate((op.double(0)? * 1.8).round() as i32),
            CommandId::Implode => effects::implode(img, op.double(0)?),
            CommandId::Levels => {
                let black = op.double(0)? * 2.55;
                let white = op.double(1)? * 2.55;
                let exponent = 1.0 / op.double(2)?;
                map_rgb(
                    img,
                    &table(|v| {
                        let t = ((v - black) / (white - black)).clamp(0.0, 1.0);
                        255.0 * t.powf(exponent)
                    }),
                )
            }
            CommandId::MotionBlur => effects::motion_blur(img, op.double(0)?, op.double(1)?),
            CommandId::Negate => {
                let mut out = img.clone();
                out.invert();
                out
            }
            CommandId::NegateGrays => negate_grays(img),
            CommandId::Normalize => normalize(img),
            CommandId::OilPaint => effects::oil_paint(img, op.double(0)?),
            CommandId::RadialBlur => effects::radial_blur(img, op.double(0)?),
            CommandId::Resize => img.resize_exact(op.uint(0)?, op.uint(1)?, FilterType::Lanczos3),
            CommandId::Roll => roll(img, op.int(0)?, op.int(1)?),
            CommandId::Rotate => {
                let background = parse_color(op.text(1)?)?;
                rotate(img, op.double(0)?, background)
            }
            CommandId::Saturation => effects::saturation(img, op.double(0)?),
            CommandId::Scale => {
                let target = scaled_extent(self.extent(), op.double(0)?)
                    .filter(|target| !target.is_empty())
                    .ok_or_else(|| BackendError::effect(command, "cannot scale to that size"))?;
                img.resize_exact(target.width, target.height, FilterType::Triangle)
            }
            CommandId::Sharpen => img.unsharpen(op.double(0)? as f32, 0),
            CommandId::Swirl => effects::swirl(img, op.double(0)?),
            CommandId::Tint => {
                let color = parse_color(op.text(0)?)?;
                effects::tint(img, color, op.double(1)?)
            }
            CommandId::VerticalFlip => img.flipv(),
            CommandId::Wave => effects::wave(img, op.double(0)?, op.double(1)?)
                .ok_or_else(|| BackendError::effect(command, "waved image is too large"))?,
            _ => {
                return Err(BackendError::Unsupported {
                    command,
                    media: MediaKind::Raster,
                });
            }
        };
        Ok(next)
    }
}

impl Backend for RasterImage {
    const MEDIA: MediaKind = MediaKind::Raster;

    fn extent(&self) -> Extent {
        Extent::new(self.image.width(), self.image.height())
    }

    fn info(&self) -> MediaInfo {
        MediaInfo {
            width: self.image.width(),
            height: self.image.height(),
            format: self
                .format
                .and_then(|f| f.extensions_str().first())
                .map(|ext| ext.to_string()),
            path: self.path.clone(),
            colors: Some(count_colors(&self.image)),
        }
    }

    fn apply(&mut self, op: &Operation) -> Result<Effect, BackendError> {
        let extent = self.extent();
        if is_identity(op, extent) {
            return Ok(Effect::Skipped);
        }
        match project_extent(op, extent) {
            Some(next) if next == extent || next.within_budget() => {}
            _ => {
                return Err(BackendError::effect(
                    op.command(),
                    format!("result exceeds the {MAX_PIXELS} pixel limit"),
                ));
            }
        }
        self.image = self.next_image(op)?;
        Ok(Effect::Applied)
    }
}

impl RasterBackend for RasterImage {}

fn count_colors(img: &DynamicImage) -> u64 {
    let buf = img.to_rgba8();
    let distinct: HashSet<[u8; 4]> = buf.pixels().map(|px| px.0).collect();
    distinct.len() as u64
}

/// Grayscale pencil sketch: blur by `amount`, trace edges, then invert.
fn charcoal(img: &DynamicImage, amount: f64) -> DynamicImage {
    let gray = DynamicImage::ImageRgba8(img.grayscale().to_rgba8());
    let softened = if amount > 0.0 { gray.blur(amount as f32) } else { gray };
    let mut edges = convolve(&softened, &EDGE_KERNEL);
    edges.invert();
    normalize(&edges)
}

/// Lookup table from a per-channel curve over `0.0..=255.0`.
fn table(curve: impl Fn(f64) -> f64) -> [u8; 256] {
    let mut out = [0u8; 256];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = curve(i as f64).round().clamp(0.0, 255.0) as u8;
    }
    out
}

fn map_rgb(img: &DynamicImage, lut: &[u8; 256]) -> DynamicImage {
    let mut buf = img.to_rgba8();
    for px in buf.pixels_mut() {
        for c in &mut px.0[..3] {
            *c = lut[usize::from(*c)];
        }
    }
    DynamicImage::ImageRgba8(buf)
}

/// 3x3 convolution over the colour channels; alpha is kept as is.
fn convolve(img: &DynamicImage, kernel: &[f32; 9]) -> DynamicImage {
    let source = img.to_rgba8();
    let mut out = img.filter3x3(kernel).to_rgba8();
    for (dst, src) in out.pixels_mut().zip(source.pixels()) {
        dst.0[3] = src.0[3];
    }
    DynamicImage::ImageRgba8(out)
}

fn negate_grays(img: &DynamicImage) -> DynamicImage {
    let mut buf = img.to_rgba8();
    for px in buf.pixels_mut() {
        let [r, g, b, _] = px.0;
        if r == g && g == b {
            for c in &mut px.0[..3] {
                *c = 255 - *c;
            }
        }
    }
    DynamicImage::ImageRgba8(buf)
}

/// Stretches each colour channel to span the full range.
fn normalize(img: &DynamicImage) -> DynamicImage {
    let mut buf = img.to_rgba8();
    let mut lo = [u8::MAX; 3];
    let mut hi = [u8::MIN; 3];
    for px in buf.pixels() {
        for ch in 0..3 {
            lo[ch] = lo[ch].min(px.0[ch]);
            hi[ch] = hi[ch].max(px.0[ch]);
        }
    }

    let luts: Vec<[u8; 256]> = (0..3)
        .map(|ch| {
            let (min, max) = (f64::from(lo[ch]), f64::from(hi[ch]));
            if max <= min {
                table(|v| v)
            } else {
                table(|v| (v - min) * 255.0 / (max - min))
            }
        })
        .collect();

    for px in buf.pixels_mut() {
        for (ch, lut) in luts.iter().enumerate() {
            px.0[ch] = lut[usize::from(px.0[ch])];
        }
    }
    DynamicImage::ImageRgba8(buf)
}

fn border(img: &DynamicImage, bw: u32, bh: u32, color: Rgba8) -> Option<DynamicImage> {
    let width = img.width().checked_add(bw.checked_mul(2)?)?;
    let height = img.height().checked_add(bh.checked_mul(2)?)?;
    let mut canvas = RgbaImage::from_pixel(width, height, Rgba(color.to_array()));
    imageops::overlay(&mut canvas, &img.to_rgba8(), i64::from(bw), i64::from(bh));
    Some(DynamicImage::ImageRgba8(canvas))
}

/// Shifts pixels by `(dx, dy)`, wrapping around the edges.
fn roll(img: &DynamicImage, dx: i32, dy: i32) -> DynamicImage {
    let src = img.to_rgba8();
    let (w, h) = src.dimensions();
    let mut out = RgbaImage::new(w, h);
    for (x, y, px) in src.enumerate_pixels() {
        let nx = (i64::from(x) + i64::from(dx)).rem_euclid(i64::from(w)) as u32;
        let ny = (i64::from(y) + i64::from(dy)).rem_euclid(i64::from(h)) as u32;
        out.put_pixel(nx, ny, *px);
    }
    DynamicImage::ImageRgba8(out)
}

/// Clockwise rotation by `angle` degrees onto a canvas large enough to hold
/// the result; uncovered corners take `background`.
fn rotate(img: &DynamicImage, angle: f64, background: Rgba8) -> DynamicImage {
    let turn = angle.rem_euclid(360.0);
    if turn == 90.0 {
        return img.rotate90();
    }
    if turn == 180.0 {
        return img.rotate180();
    }
    if turn == 270.0 {
        return img.rotate270();
    }

    let src = img.to_rgba8();
    let target = rotated_extent(Extent::new(src.width(), src.height()), angle);
    let mut out = RgbaImage::from_pixel(target.width, target.height, Rgba(background.to_array()));

    let (sin, cos) = turn.to_radians().sin_cos();
    let (scx, scy) = (f64::from(src.width()) / 2.0, f64::from(src.height()) / 2.0);
    let (dcx, dcy) = (f64::from(target.width) / 2.0, f64::from(target.height) / 2.0);

    for (x, y, px) in out.enumerate_pixels_mut() {
        let dx = f64::from(x) + 0.5 - dcx;
        let dy = f64::from(y) + 0.5 - dcy;
        let sx = dx * cos + dy * sin + scx;
        let sy = -dx * sin + dy * cos + scy;
        if sx < 0.0 || sy < 0.0 {
            continue;
        }
        let (sx, sy) = (sx as u32, sy as u32);
        if sx < src.width() && sy < src.height() {
            *px = *src.get_pixel(sx, sy);
        }
    }
    DynamicImage::ImageRgba8(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(command: CommandId, args: Vec<crate::op::Arg>) -> Operation {
        Operation::with_args(command, args).unwrap()
    }

    #[test]
    fn oblique_rotation_matches_projected_extent() {
        let mut raster = RasterImage::blank(40, 20, Rgba8::rgb(10, 20, 30));
        let rotate = op(CommandId::Rotate, vec![30.0f64.into(), "white".into()]);
        let expected = rotated_extent(raster.extent(), 30.0);
        assert_eq!(raster.apply(&rotate).unwrap(), Effect::Applied);
        assert_eq!(raster.extent(), expected);
    }

    #[test]
    fn roll_wraps_pixels() {
        let mut buf = RgbaImage::from_pixel(4, 1, Rgba([0, 0, 0, 255]));
        buf.put_pixel(3, 0, Rgba([255, 0, 0, 255]));
        let mut raster = RasterImage::from_image(DynamicImage::ImageRgba8(buf));
        raster.apply(&op(CommandId::Roll, vec![1i32.into(), 0i32.into()])).unwrap();
        assert_eq!(raster.image().to_rgba8().get_pixel(0, 0).0, [255, 0, 0, 255]);
    }

    #[test]
    fn border_grows_both_axes() {
        let mut raster = RasterImage::blank(10, 10, Rgba8::BLACK);
        raster
            .apply(&op(CommandId::Border, vec![2u32.into(), 3u32.into(), "red".into()]))
            .unwrap();
        assert_eq!(raster.extent(), Extent::new(14, 16));
        assert_eq!(raster.image().to_rgba8().get_pixel(0, 0).0, [255, 0, 0, 255]);
    }

    #[test]
    fn vector_command_is_unsupported() {
        let mut raster = RasterImage::blank(4, 4, Rgba8::BLACK);
        let err = raster.apply(&Operation::new(CommandId::Stroke)).unwrap_err();
        assert!(matches!(err, BackendError::Unsupported { command: CommandId::Stroke, .. }));
    }

    #[test]
    fn oversized_result_fails_before_allocating() {
        let mut raster = RasterImage::blank(4, 4, Rgba8::BLACK);
        for oversized in [
            op(CommandId::Scale, vec![1e12f64.into()]),
            op(CommandId::Resize, vec![u32::MAX.into(), u32::MAX.into()]),
            op(CommandId::Border, vec![u32::MAX.into(), 0u32.into(), "red".into()]),
        ] {
            let err = raster.apply(&oversized).unwrap_err();
            assert!(matches!(err, BackendError::Effect { .. }), "{err}");
        }
        assert_eq!(raster.extent(), Extent::new(4, 4));
    }

    #[test]
    fn wave_matches_projected_extent() {
        let mut raster = RasterImage::blank(12, 6, Rgba8::BLACK);
        let wave = op(CommandId::Wave, vec![1.5f64.into(), 6.0f64.into()]);
        let expected = project_extent(&wave, raster.extent());
        raster.apply(&wave).unwrap();
        assert_eq!(Some(raster.extent()), expected);
        assert_eq!(raster.extent(), Extent::new(12, 10));
    }

    #[test]
    fn info_counts_distinct_colours() {
        let mut buf = RgbaImage::from_pixel(3, 1, Rgba([0, 0, 0, 255]));
        buf.put_pixel(2, 0, Rgba([9, 9, 9, 255]));
        let raster = RasterImage::from_image(DynamicImage::ImageRgba8(buf));
        assert_eq!(raster.info().colors, Some(2));
    }
}
