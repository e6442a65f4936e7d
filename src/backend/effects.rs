//! Pixel passes the `image` crate has no direct counterpart for.
//!
//! Every pass works on an RGBA8 copy of the input and leaves alpha alone
//! unless the geometry changes. Geometric passes sample with nearest-neighbour
//! lookups clamped to the source edges.

use std::f64::consts::PI;

use image::{DynamicImage, Rgba, RgbaImage};

use crate::{color::Rgba8, document::validate::waved_extent, types::Extent};

/// Longest blur trail, in samples, so cost stays bounded for huge amounts.
const MAX_BLUR_SAMPLES: usize = 256;
/// Widest oil-paint neighbourhood radius.
const MAX_OIL_RADIUS: i64 = 16;

fn clamped(src: &RgbaImage, x: f64, y: f64) -> Rgba<u8> {
    let max_x = f64::from(src.width() - 1);
    let max_y = f64::from(src.height() - 1);
    let sx = x.floor().clamp(0.0, max_x) as u32;
    let sy = y.floor().clamp(0.0, max_y) as u32;
    *src.get_pixel(sx, sy)
}

fn average(samples: impl Iterator<Item = Rgba<u8>>) -> Rgba<u8> {
    let mut sum = [0u64; 4];
    let mut count = 0u64;
    for px in samples {
        for (acc, c) in sum.iter_mut().zip(px.0) {
            *acc += u64::from(c);
        }
        count += 1;
    }
    if count == 0 {
        return Rgba([0, 0, 0, 0]);
    }
    Rgba(sum.map(|acc| ((acc + count / 2) / count) as u8))
}

/// Rebuilds every pixel from a sampler over the source.
fn resample(img: &DynamicImage, sample: impl Fn(&RgbaImage, u32, u32) -> Rgba<u8>) -> DynamicImage {
    let src = img.to_rgba8();
    if src.width() == 0 || src.height() == 0 {
        return DynamicImage::ImageRgba8(src);
    }
    let out = RgbaImage::from_fn(src.width(), src.height(), |x, y| sample(&src, x, y));
    DynamicImage::ImageRgba8(out)
}

fn rgb_to_hsl(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    let d = max - min;
    if d == 0.0 {
        return (0.0, 0.0, l);
    }
    let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };
    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    (h / 6.0, s, l)
}

fn hue_channel(p: f64, q: f64, t: f64) -> f64 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (f64, f64, f64) {
    if s == 0.0 {
        return (l, l, l);
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    (
        hue_channel(p, q, h + 1.0 / 3.0),
        hue_channel(p, q, h),
        hue_channel(p, q, h - 1.0 / 3.0),
    )
}

fn to_byte(v: f64) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Scales HSL saturation by `(100 + value) / 100`.
pub(super) fn saturation(img: &DynamicImage, value: f64) -> DynamicImage {
    let factor = (100.0 + value) / 100.0;
    let mut buf = img.to_rgba8();
    for px in buf.pixels_mut() {
        let [r, g, b, _] = px.0.map(|c| f64::from(c) / 255.0);
        let (h, s, l) = rgb_to_hsl(r, g, b);
        let (r, g, b) = hsl_to_rgb(h, (s * factor).clamp(0.0, 1.0), l);
        px.0[0] = to_byte(r);
        px.0[1] = to_byte(g);
        px.0[2] = to_byte(b);
    }
    DynamicImage::ImageRgba8(buf)
}

/// Blends every pixel toward `color` by `opacity` in `[0, 1]`.
pub(super) fn tint(img: &DynamicImage, color: Rgba8, opacity: f64) -> DynamicImage {
    let target = [color.r, color.g, color.b].map(f64::from);
    let mut buf = img.to_rgba8();
    for px in buf.pixels_mut() {
        for (c, t) in px.0[..3].iter_mut().zip(target) {
            let v = f64::from(*c);
            *c = (v + (t - v) * opacity).round().clamp(0.0, 255.0) as u8;
        }
    }
    DynamicImage::ImageRgba8(buf)
}

/// Per-channel histogram equalization.
pub(super) fn equalize(img: &DynamicImage) -> DynamicImage {
    let mut buf = img.to_rgba8();
    let total = u64::from(buf.width()) * u64::from(buf.height());
    if total == 0 {
        return DynamicImage::ImageRgba8(buf);
    }

    let mut hist = [[0u64; 256]; 3];
    for px in buf.pixels() {
        for ch in 0..3 {
            hist[ch][usize::from(px.0[ch])] += 1;
        }
    }

    let luts = hist.map(|counts| {
        let mut lut = [0u8; 256];
        let mut cdf = 0u64;
        let first = counts.iter().copied().find(|&n| n > 0).unwrap_or(0);
        for (v, n) in counts.iter().enumerate() {
            cdf += n;
            lut[v] = if total == first {
                v as u8
            } else {
                ((cdf.saturating_sub(first)) * 255 / (total - first)) as u8
            };
        }
        lut
    });

    for px in buf.pixels_mut() {
        for (ch, lut) in luts.iter().enumerate() {
            px.0[ch] = lut[usize::from(px.0[ch])];
        }
    }
    DynamicImage::ImageRgba8(buf)
}

/// 3x3 median of each colour channel.
pub(super) fn despeckle(img: &DynamicImage) -> DynamicImage {
    resample(img, |src, x, y| {
        let mut window = [[0u8; 9]; 3];
        let mut n = 0;
        for dy in -1i64..=1 {
            for dx in -1i64..=1 {
                let px = clamped(src, (i64::from(x) + dx) as f64, (i64::from(y) + dy) as f64);
                for ch in 0..3 {
                    window[ch][n] = px.0[ch];
                }
                n += 1;
            }
        }
        let mut out = *src.get_pixel(x, y);
        for (ch, values) in window.iter_mut().enumerate() {
            values.sort_unstable();
            out.0[ch] = values[4];
        }
        out
    })
}

/// Averages a trail of `amount` pixels behind each pixel, heading `angle` degrees.
pub(super) fn motion_blur(img: &DynamicImage, amount: f64, angle: f64) -> DynamicImage {
    let steps = (amount.ceil() as usize).clamp(1, MAX_BLUR_SAMPLES);
    let (sin, cos) = angle.to_radians().sin_cos();
    resample(img, |src, x, y| {
        let (fx, fy) = (f64::from(x), f64::from(y));
        average((0..=steps).map(|k| {
            let t = k as f64 * amount / steps as f64;
            clamped(src, fx - t * cos, fy - t * sin)
        }))
    })
}

/// Averages samples swept through `angle` degrees around the image centre.
pub(super) fn radial_blur(img: &DynamicImage, angle: f64) -> DynamicImage {
    let steps = (angle.abs().ceil() as usize).clamp(2, MAX_BLUR_SAMPLES);
    let sweep = angle.to_radians();
    let offsets: Vec<(f64, f64)> = (0..steps)
        .map(|k| (sweep * (k as f64 / (steps - 1) as f64 - 0.5)).sin_cos())
        .collect();
    resample(img, |src, x, y| {
        let cx = f64::from(src.width()) / 2.0;
        let cy = f64::from(src.height()) / 2.0;
        let dx = f64::from(x) + 0.5 - cx;
        let dy = f64::from(y) + 0.5 - cy;
        average(
            offsets
                .iter()
                .map(|&(sin, cos)| clamped(src, dx * cos - dy * sin + cx, dx * sin + dy * cos + cy)),
        )
    })
}

/// Centre, per-axis scale, and radius of the effect circle, stretched to the
/// longer side.
fn lens(src: &RgbaImage) -> (f64, f64, f64, f64, f64) {
    let (w, h) = (f64::from(src.width()), f64::from(src.height()));
    let (cx, cy) = (w / 2.0, h / 2.0);
    let (mut sx, mut sy) = (1.0, 1.0);
    if w > h {
        sy = w / h;
    } else if h > w {
        sx = h / w;
    }
    (cx, cy, sx, sy, cx.max(cy))
}

/// Pulls pixels toward (positive `amount`) or pushes them away from the centre.
pub(super) fn implode(img: &DynamicImage, amount: f64) -> DynamicImage {
    resample(img, |src, x, y| {
        let (cx, cy, sx, sy, radius) = lens(src);
        let dx = sx * (f64::from(x) + 0.5 - cx);
        let dy = sy * (f64::from(y) + 0.5 - cy);
        let distance = (dx * dx + dy * dy).sqrt();
        if distance >= radius || radius == 0.0 {
            return *src.get_pixel(x, y);
        }
        let factor = if distance > 0.0 {
            (PI * distance / radius / 2.0).sin().powf(-amount)
        } else {
            1.0
        };
        clamped(src, factor * dx / sx + cx, factor * dy / sy + cy)
    })
}

/// Twists the image around its centre by up to `degrees` at the middle.
pub(super) fn swirl(img: &DynamicImage, degrees: f64) -> DynamicImage {
    let turn = degrees.to_radians();
    resample(img, |src, x, y| {
        let (cx, cy, sx, sy, radius) = lens(src);
        let dx = sx * (f64::from(x) + 0.5 - cx);
        let dy = sy * (f64::from(y) + 0.5 - cy);
        let distance = (dx * dx + dy * dy).sqrt();
        if distance >= radius || radius == 0.0 {
            return *src.get_pixel(x, y);
        }
        let falloff = 1.0 - distance / radius;
        let (sin, cos) = (turn * falloff * falloff).sin_cos();
        clamped(
            src,
            (cos * dx - sin * dy) / sx + cx,
            (sin * dx + cos * dy) / sy + cy,
        )
    })
}

/// Replaces each pixel with the most common intensity in its neighbourhood.
pub(super) fn oil_paint(img: &DynamicImage, radius: f64) -> DynamicImage {
    let r = (radius.ceil() as i64).clamp(1, MAX_OIL_RADIUS);
    resample(img, |src, x, y| {
        let mut counts = [0u32; 256];
        let mut best = (0u32, *src.get_pixel(x, y));
        for dy in -r..=r {
            for dx in -r..=r {
                let px = clamped(src, (i64::from(x) + dx) as f64, (i64::from(y) + dy) as f64);
                let [red, green, blue, _] = px.0.map(u32::from);
                let level = ((red * 299 + green * 587 + blue * 114) / 1000) as usize;
                counts[level] += 1;
                if counts[level] > best.0 {
                    best = (counts[level], px);
                }
            }
        }
        best.1
    })
}

/// Shifts each column vertically along a sine of `amplitude` and `wavelength`;
/// the canvas grows so no row is lost and uncovered pixels are transparent.
pub(super) fn wave(img: &DynamicImage, amplitude: f64, wavelength: f64) -> Option<DynamicImage> {
    let src = img.to_rgba8();
    let target = waved_extent(Extent::new(src.width(), src.height()), amplitude)?;
    let offsets: Vec<f64> = (0..src.width())
        .map(|x| amplitude + amplitude * (2.0 * PI * f64::from(x) / wavelength).sin())
        .collect();
    let out = RgbaImage::from_fn(target.width, target.height, |x, y| {
        let sy = (f64::from(y) - offsets[x as usize]).floor();
        if sy < 0.0 || sy >= f64::from(src.height()) {
            Rgba([0, 0, 0, 0])
        } else {
            *src.get_pixel(x, sy as u32)
        }
    });
    Some(DynamicImage::ImageRgba8(out))
}
