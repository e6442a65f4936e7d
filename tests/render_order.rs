use image::{DynamicImage, Rgba, RgbaImage};
use proptest::prelude::*;

use medialog::{
    backend::{
        Backend, BackendError, Effect, RasterBackend, Renderer, raster::RasterImage,
    },
    color::Rgba8,
    command::CommandId,
    config::DocumentConfig,
    core::log::OperationLog,
    document::{
        Document,
        validate::{is_identity, project_extent},
    },
    op::{Arg, Operation},
    types::{Extent, MediaInfo, MediaKind},
};

/// Raster stand-in that remembers every call and can be told to fail.
struct Recorder {
    extent: Extent,
    calls: Vec<CommandId>,
    fail_on: Option<CommandId>,
}

impl Recorder {
    fn new(width: u32, height: u32) -> Self {
        Self {
            extent: Extent::new(width, height),
            calls: Vec::new(),
            fail_on: None,
        }
    }
}

impl Backend for Recorder {
    const MEDIA: MediaKind = MediaKind::Raster;

    fn extent(&self) -> Extent {
        self.extent
    }

    fn info(&self) -> MediaInfo {
        MediaInfo {
            width: self.extent.width,
            height: self.extent.height,
            format: None,
            path: None,
            colors: None,
        }
    }

    fn apply(&mut self, op: &Operation) -> Result<Effect, BackendError> {
        self.calls.push(op.command());
        if self.fail_on == Some(op.command()) {
            return Err(BackendError::Unsupported {
                command: op.command(),
                media: MediaKind::Raster,
            });
        }
        if is_identity(op, self.extent) {
            return Ok(Effect::Skipped);
        }
        self.extent = project_extent(op, self.extent).ok_or_else(|| BackendError::Effect {
            command: op.command(),
            reason: "extent overflow".to_string(),
        })?;
        Ok(Effect::Applied)
    }
}

impl RasterBackend for Recorder {}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

#[test]
fn render_aborts_at_first_failure() {
    init_tracing();
    let mut recorder = Recorder::new(64, 64);
    recorder.fail_on = Some(CommandId::Swirl);
    let mut doc = Document::new(recorder);
    doc.negate().expect("negate");
    doc.swirl(45.0).expect("swirl");
    doc.normalize().expect("normalize");

    let err = doc.render().expect_err("swirl fails");
    assert_eq!(err.index, 1);
    assert_eq!(err.command, CommandId::Swirl);
    assert!(matches!(err.source, BackendError::Unsupported { .. }));

    assert_eq!(doc.backend().calls, vec![CommandId::Negate, CommandId::Swirl]);
    assert_eq!(doc.log().len(), 3);
}

#[test]
fn call_order_follows_log_order() {
    let mut first = Document::new(Recorder::new(100, 50));
    first.rotate(90.0).expect("rotate");
    first.crop(0, 0, 50, 50).expect("crop");
    first.render().expect("render");

    let mut second = Document::new(Recorder::new(100, 50));
    second.crop(0, 0, 50, 50).expect("crop");
    second.rotate(90.0).expect("rotate");
    second.render().expect("render");

    assert_eq!(first.backend().calls, vec![CommandId::Rotate, CommandId::Crop]);
    assert_eq!(second.backend().calls, vec![CommandId::Crop, CommandId::Rotate]);
}

#[test]
fn rotate_and_crop_do_not_commute_on_pixels() {
    let marked = || {
        let mut buf = RgbaImage::from_pixel(50, 100, Rgba([0, 0, 0, 255]));
        buf.put_pixel(0, 0, Rgba([255, 255, 255, 255]));
        RasterImage::from_image(DynamicImage::ImageRgba8(buf))
    };
    let white = |raster: &RasterImage| {
        raster
            .image()
            .to_rgba8()
            .pixels()
            .filter(|p| p.0 == [255, 255, 255, 255])
            .count()
    };

    let mut rotate_first = Document::new(marked());
    rotate_first.rotate(90.0).expect("rotate");
    rotate_first.crop(0, 0, 50, 50).expect("crop");
    rotate_first.render().expect("render");

    let mut crop_first = Document::new(marked());
    crop_first.crop(0, 0, 50, 50).expect("crop");
    crop_first.rotate(90.0).expect("rotate");
    crop_first.render().expect("render");

    assert_eq!(rotate_first.extent(), crop_first.extent());
    assert_eq!(white(rotate_first.backend()), 0);
    assert_eq!(white(crop_first.backend()), 1);
}

#[test]
fn rendering_twice_compounds_effects() {
    let mut doc = Document::new(RasterImage::blank(2, 2, Rgba8::rgb(100, 100, 100)));
    doc.brightness(50.0).expect("brightness");

    doc.render().expect("first render");
    let px = doc.backend().image().to_rgba8().get_pixel(0, 0).0;
    assert_eq!(px, [150, 150, 150, 255]);

    doc.render().expect("second render");
    let px = doc.backend().image().to_rgba8().get_pixel(0, 0).0;
    assert_eq!(px, [225, 225, 225, 255]);
    assert_eq!(doc.log().len(), 1);
}

#[test]
fn rendered_extent_matches_projection() {
    let mut doc = Document::new(RasterImage::blank(120, 80, Rgba8::BLACK));
    doc.rotate_with_background(30.0, "white").expect("rotate");
    doc.border(3, 4, "red").expect("border");
    doc.scale(0.5).expect("scale");
    doc.crop(2, 2, 40, 30).expect("crop");
    doc.resize(33, 21).expect("resize");
    let projected = doc.extent();

    let report = doc.render().expect("render");
    assert_eq!(report.applied, 5);
    assert_eq!(doc.backend().extent(), projected);
    assert_eq!(projected, Extent::new(33, 21));
}

#[test]
fn every_raster_command_renders() {
    let mut doc = Document::new(RasterImage::blank(16, 12, Rgba8::rgb(90, 120, 150)));
    doc.charcoal(1.0).expect("charcoal");
    doc.despeckle().expect("despeckle");
    doc.equalize().expect("equalize");
    doc.implode(0.4).expect("implode");
    doc.motion_blur(3.0, 45.0).expect("motionblur");
    doc.oil_paint(1.0).expect("oilpaint");
    doc.radial_blur(10.0).expect("radialblur");
    doc.saturation(-50.0).expect("saturation");
    doc.swirl(60.0).expect("swirl");
    doc.tint("#ff8800", 0.3).expect("tint");
    doc.wave(2.0, 8.0).expect("wave");

    let report = doc.render().expect("render");
    assert_eq!(report.total(), 11);
    assert_eq!(doc.info().width, 16);
    assert_eq!(doc.info().height, 16);
    assert_eq!(doc.extent(), Extent::new(16, 16));
}

#[test]
fn oversized_operation_aborts_render_without_allocating() {
    let mut log = OperationLog::new();
    log.append(Operation::new(CommandId::Negate)).expect("append");
    log.append(Operation::with_args(CommandId::Scale, [Arg::Double(1e12)]).expect("op"))
        .expect("append");
    log.append(Operation::new(CommandId::VerticalFlip)).expect("append");

    let mut raster = RasterImage::blank(4, 4, Rgba8::BLACK);
    let err = Renderer::default()
        .render(&log, &mut raster)
        .expect_err("scale overflows");
    assert_eq!(err.index, 1);
    assert!(matches!(err.source, BackendError::Effect { .. }));
    assert_eq!(raster.extent(), Extent::new(4, 4));
    let px = raster.image().to_rgba8().get_pixel(0, 0).0;
    assert_eq!(px, [255, 255, 255, 255], "negate before the failure stays applied");
}

#[test]
fn verbose_render_still_counts_every_operation() {
    init_tracing();
    let config = DocumentConfig {
        verbose_render: true,
        ..DocumentConfig::default()
    };
    let mut doc = Document::with_config(Recorder::new(10, 10), config).expect("config");
    doc.gamma(1.0).expect("gamma");
    doc.gamma(2.2).expect("gamma");
    let report = doc.render().expect("render");
    assert_eq!((report.applied, report.skipped), (1, 1));
}

fn simple_op() -> impl Strategy<Value = u8> {
    0u8..4
}

proptest! {
    #[test]
    fn backend_sees_each_operation_once_in_order(picks in prop::collection::vec(simple_op(), 0..40)) {
        let mut doc = Document::new(Recorder::new(16, 16));
        for (i, pick) in picks.iter().enumerate() {
            match pick {
                0 => doc.negate(),
                1 => doc.brightness(i as f64 - 20.0),
                2 => doc.roll(i as i32, 1),
                _ => doc.horizontal_flip(),
            }
            .expect("record");
        }

        let report = doc.render().expect("render");
        prop_assert_eq!(report.total(), picks.len());
        let logged: Vec<_> = doc.log().iter().map(Operation::command).collect();
        prop_assert_eq!(&doc.backend().calls, &logged);
    }
}
