use image::{Rgba, RgbaImage};
use pass_studio::draw::composite::letterbox;
use pass_studio::draw::model::{Color, PaletteColor, ToolWidths};
use pass_studio::draw::{BackgroundLoader, BackgroundStatus, CanvasSurface, ToolState};
use pass_studio::{Error, Result};

struct SolidLoader {
    width: u32,
    height: u32,
}

impl BackgroundLoader for SolidLoader {
    fn load(&self, _source: &str) -> Result<RgbaImage> {
        Ok(RgbaImage::from_pixel(self.width, self.height, Rgba([20, 40, 60, 255])))
    }
}

struct Unreachable;

impl BackgroundLoader for Unreachable {
    fn load(&self, source: &str) -> Result<RgbaImage> {
        Err(Error::BackgroundLoad {
            source_ref: source.to_string(),
            reason: "connection refused".into(),
        })
    }
}

#[test]
fn same_aspect_background_fills_the_buffer() {
    let placement = letterbox(1200, 900, 400, 300);
    assert_eq!(
        (placement.x, placement.y, placement.width, placement.height),
        (0.0, 0.0, 1200.0, 900.0)
    );
}

#[test]
fn portrait_background_is_pillarboxed() {
    let placement = letterbox(1200, 900, 300, 400);
    assert_eq!(placement.width, 675.0);
    assert_eq!(placement.height, 900.0);
    assert_eq!(placement.x, 262.5);
    assert_eq!(placement.y, 0.0);
}

#[test]
fn placement_is_contained_centered_and_touches_one_axis() {
    let buffers = [(1200, 900), (900, 1200), (640, 480), (1, 1), (1000, 10)];
    let images = [(400, 300), (300, 400), (1, 1), (1920, 1080), (7, 3000), (3000, 7)];
    for &(bw, bh) in &buffers {
        for &(iw, ih) in &images {
            let p = letterbox(bw, bh, iw, ih);
            let (bw, bh) = (bw as f64, bh as f64);
            let eps = 1e-9 * bw.max(bh);

            assert!(p.width <= bw + eps && p.height <= bh + eps, "{p:?} exceeds {bw}x{bh}");
            assert!(p.x >= -eps && p.y >= -eps);
            assert!(((p.x * 2.0 + p.width) - bw).abs() <= eps, "not centered: {p:?}");
            assert!(((p.y * 2.0 + p.height) - bh).abs() <= eps, "not centered: {p:?}");
            assert!(
                (p.width - bw).abs() <= eps || (p.height - bh).abs() <= eps,
                "{p:?} touches neither edge of {bw}x{bh}"
            );
            let image_aspect = iw as f64 / ih as f64;
            assert!((p.width / p.height - image_aspect).abs() <= 1e-9 * image_aspect.max(1.0));
        }
    }
}

#[test]
fn portrait_background_leaves_white_margins() {
    let mut surface = CanvasSurface::new(1200, 900);
    let status = surface.initialize(
        "portrait.png",
        &SolidLoader {
            width: 300,
            height: 400,
        },
    );
    assert!(matches!(status, BackgroundStatus::Drawn(_)));

    let buffer = surface.buffer();
    assert_eq!(buffer.pixel(0, 450), Color::WHITE);
    assert_eq!(buffer.pixel(1199, 450), Color::WHITE);
    assert_eq!(buffer.pixel(600, 0), Color::rgb(20, 40, 60));
    assert_eq!(buffer.pixel(600, 899), Color::rgb(20, 40, 60));
    assert_eq!(buffer.pixel(270, 450), Color::rgb(20, 40, 60));
    assert_eq!(buffer.pixel(255, 450), Color::WHITE);
}

#[test]
fn reset_twice_matches_reset_once() {
    let loader = SolidLoader {
        width: 300,
        height: 400,
    };
    let mut surface = CanvasSurface::new(120, 90);
    surface.initialize("bg.png", &loader);
    let pristine = surface.buffer().clone();

    let pen = ToolState::pen(PaletteColor::Magenta, ToolWidths::default());
    assert!(surface.apply_stroke(&[(5.0, 5.0), (100.0, 80.0)], pen));
    assert_ne!(surface.buffer(), &pristine);

    surface.reset(&loader);
    let once = surface.buffer().clone();
    surface.reset(&loader);

    assert_eq!(surface.buffer(), &once);
    assert_eq!(once, pristine);
}

#[test]
fn unreachable_background_is_reported_and_leaves_white() {
    let mut surface = CanvasSurface::new(60, 40);
    match surface.initialize("https://example.invalid/bg.png", &Unreachable) {
        BackgroundStatus::Missing { reason } => assert!(reason.contains("connection refused")),
        other => panic!("expected a missing background, got {other:?}"),
    }
    assert!(surface.buffer().pixels.iter().all(|b| *b == 255));

    // reset retries the load since nothing was cached
    assert!(!surface.reset(&Unreachable).is_drawn());
    assert!(surface
        .reset(&SolidLoader {
            width: 6,
            height: 4
        })
        .is_drawn());
}
