use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use image::RgbaImage;
use reqwest::blocking::Client;

use crate::draw::composite::{draw_background, Placement, RgbaBuffer};
use crate::draw::model::{CanvasPoint, Color, ToolState};
use crate::draw::render::draw_polyline;
use crate::error::{Error, Result};

pub const DEFAULT_CANVAS_WIDTH: u32 = 1200;
pub const DEFAULT_CANVAS_HEIGHT: u32 = 900;

/// Source of decoded background images.
pub trait BackgroundLoader: Send + Sync {
    fn load(&self, source: &str) -> Result<RgbaImage>;
}

/// Loads `http(s)://` sources over the network and anything else from disk.
pub struct DefaultLoader {
    client: Client,
}

impl DefaultLoader {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("pass-studio background loader")
            .build()?;
        Ok(Self { client })
    }

    fn fetch(&self, source: &str) -> Result<Vec<u8>> {
        let response = self.client.get(source).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }
        Ok(response.bytes()?.to_vec())
    }
}

impl BackgroundLoader for DefaultLoader {
    fn load(&self, source: &str) -> Result<RgbaImage> {
        let decoded = if source.starts_with("http://") || source.starts_with("https://") {
            let bytes = self.fetch(source)?;
            image::load_from_memory(&bytes)?
        } else {
            image::open(source)?
        };
        Ok(decoded.to_rgba8())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BackgroundStatus {
    Drawn(Placement),
    /// Only the white fill is present.
    Missing { reason: String },
}

impl BackgroundStatus {
    pub fn is_drawn(&self) -> bool {
        matches!(self, BackgroundStatus::Drawn(_))
    }
}

/// A background load running on a worker thread.
pub struct PendingBackground {
    source: String,
    generation: u64,
    rx: Receiver<Result<RgbaImage>>,
}

/// Fixed-size drawing surface. Strokes are accepted only once a background
/// initialization has completed, successfully or not.
pub struct CanvasSurface {
    buffer: RgbaBuffer,
    source: Option<String>,
    background: Option<RgbaImage>,
    ready: bool,
    generation: u64,
}

impl CanvasSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            buffer: RgbaBuffer::new(width, height, Color::WHITE),
            source: None,
            background: None,
            ready: false,
            generation: 0,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.buffer.width, self.buffer.height)
    }

    pub fn buffer(&self) -> &RgbaBuffer {
        &self.buffer
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Load `source` and redraw the white fill plus letterboxed background.
    pub fn initialize(&mut self, source: &str, loader: &dyn BackgroundLoader) -> BackgroundStatus {
        self.generation += 1;
        self.source = Some(source.to_string());
        self.background = None;
        self.ready = false;
        let loaded = loader.load(source);
        self.apply_loaded(source, loaded)
    }

    /// Start loading on a worker thread. Until the result is applied with
    /// [`CanvasSurface::poll_background`] the surface ignores strokes.
    pub fn begin_initialize(
        &mut self,
        source: &str,
        loader: Arc<dyn BackgroundLoader>,
    ) -> PendingBackground {
        self.generation += 1;
        self.source = Some(source.to_string());
        self.background = None;
        self.ready = false;

        let (tx, rx) = mpsc::channel();
        let worker_source = source.to_string();
        std::thread::spawn(move || {
            let _ = tx.send(loader.load(&worker_source));
        });

        PendingBackground {
            source: source.to_string(),
            generation: self.generation,
            rx,
        }
    }

    /// Apply a finished background load. Returns `None` while the load is
    /// still running or when a newer initialization superseded it.
    pub fn poll_background(&mut self, pending: &PendingBackground) -> Option<BackgroundStatus> {
        if pending.generation != self.generation {
            tracing::debug!(source = %pending.source, "stale background load ignored");
            return None;
        }
        let loaded = match pending.rx.try_recv() {
            Ok(loaded) => loaded,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(Error::BackgroundLoad {
                source_ref: pending.source.clone(),
                reason: "loader thread exited".into(),
            }),
        };
        Some(self.apply_loaded(&pending.source, loaded))
    }

    /// Block until the pending load finishes.
    pub fn wait_background(&mut self, pending: PendingBackground) -> Option<BackgroundStatus> {
        if pending.generation != self.generation {
            return None;
        }
        let loaded = pending.rx.recv().unwrap_or_else(|_| {
            Err(Error::BackgroundLoad {
                source_ref: pending.source.clone(),
                reason: "loader thread exited".into(),
            })
        });
        Some(self.apply_loaded(&pending.source, loaded))
    }

    /// Discard every stroke and redraw the background. Reuses the decoded
    /// image when one is cached, otherwise loads the source again.
    pub fn reset(&mut self, loader: &dyn BackgroundLoader) -> BackgroundStatus {
        if let Some(image) = self.background.take() {
            let status = self.redraw(&image);
            self.background = Some(image);
            self.ready = true;
            return status;
        }
        match self.source.clone() {
            Some(source) => self.initialize(&source, loader),
            None => {
                self.buffer.fill(Color::WHITE);
                self.ready = true;
                BackgroundStatus::Missing {
                    reason: "no background configured".into(),
                }
            }
        }
    }

    /// Paint `points` as one continuous round-capped line. Returns `false`
    /// when nothing was painted.
    pub fn apply_stroke(&mut self, points: &[CanvasPoint], tool: ToolState) -> bool {
        if !self.ready {
            tracing::debug!("stroke ignored: background not loaded yet");
            return false;
        }
        draw_polyline(&mut self.buffer, points, tool.color, tool.width).is_some()
    }

    fn apply_loaded(&mut self, source: &str, loaded: Result<RgbaImage>) -> BackgroundStatus {
        self.ready = true;
        match loaded {
            Ok(image) => {
                let status = self.redraw(&image);
                tracing::debug!(
                    source,
                    width = image.width(),
                    height = image.height(),
                    "background drawn"
                );
                self.background = Some(image);
                status
            }
            Err(err) => {
                self.buffer.fill(Color::WHITE);
                tracing::warn!(source, error = %err, "background image unavailable; canvas left blank");
                BackgroundStatus::Missing {
                    reason: err.to_string(),
                }
            }
        }
    }

    fn redraw(&mut self, image: &RgbaImage) -> BackgroundStatus {
        match draw_background(&mut self.buffer, image) {
            Some(placement) => BackgroundStatus::Drawn(placement),
            None => BackgroundStatus::Missing {
                reason: "background image has no pixels".into(),
            },
        }
    }
}

impl Default for CanvasSurface {
    fn default() -> Self {
        Self::new(DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::model::{PaletteColor, ToolWidths};
    use image::Rgba;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingLoader {
        calls: AtomicUsize,
    }

    impl BackgroundLoader for CountingLoader {
        fn load(&self, _source: &str) -> Result<RgbaImage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(RgbaImage::from_pixel(4, 3, Rgba([0, 0, 255, 255])))
        }
    }

    /// Blocks inside `load` until the test releases it.
    struct GatedLoader {
        gate: std::sync::Mutex<Receiver<()>>,
    }

    impl BackgroundLoader for GatedLoader {
        fn load(&self, _source: &str) -> Result<RgbaImage> {
            if let Ok(gate) = self.gate.lock() {
                let _ = gate.recv();
            }
            Ok(RgbaImage::from_pixel(8, 6, Rgba([0, 128, 0, 255])))
        }
    }

    struct FailingLoader;

    impl BackgroundLoader for FailingLoader {
        fn load(&self, source: &str) -> Result<RgbaImage> {
            Err(Error::BackgroundLoad {
                source_ref: source.to_string(),
                reason: "unreachable".into(),
            })
        }
    }

    #[test]
    fn strokes_are_ignored_before_initialization() {
        let mut surface = CanvasSurface::new(20, 20);
        let tool = ToolState::pen(PaletteColor::Red, ToolWidths::default());
        assert!(!surface.apply_stroke(&[(2.0, 2.0), (10.0, 10.0)], tool));
        assert!(surface.buffer().pixels.iter().all(|b| *b == 255));
    }

    #[test]
    fn reset_reuses_cached_background() {
        let loader = CountingLoader {
            calls: AtomicUsize::new(0),
        };
        let mut surface = CanvasSurface::new(40, 30);
        assert!(surface.initialize("bg.png", &loader).is_drawn());
        surface.reset(&loader);
        surface.reset(&loader);
        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_load_is_reported_and_surface_stays_usable() {
        let mut surface = CanvasSurface::new(10, 10);
        let status = surface.initialize("https://example.invalid/bg.png", &FailingLoader);
        match status {
            BackgroundStatus::Missing { reason } => assert!(reason.contains("unreachable")),
            other => panic!("unexpected status {other:?}"),
        }
        assert!(surface.is_ready());
        assert_eq!(surface.buffer().pixel(5, 5), Color::WHITE);

        let tool = ToolState::pen(PaletteColor::Black, ToolWidths::default());
        assert!(surface.apply_stroke(&[(1.0, 5.0), (9.0, 5.0)], tool));
        assert_eq!(surface.buffer().pixel(5, 5), Color::BLACK);
    }

    #[test]
    fn superseded_background_load_is_ignored() {
        let loader: Arc<dyn BackgroundLoader> = Arc::new(CountingLoader {
            calls: AtomicUsize::new(0),
        });
        let mut surface = CanvasSurface::new(8, 6);
        let first = surface.begin_initialize("first.png", Arc::clone(&loader));
        let second = surface.begin_initialize("second.png", loader);

        assert_eq!(surface.wait_background(first), None);
        assert!(!surface.is_ready());
        let status = surface.wait_background(second).expect("current load");
        assert!(status.is_drawn());
        assert!(surface.is_ready());
    }

    #[test]
    fn strokes_wait_for_a_pending_background() {
        let (release, gate) = mpsc::channel();
        let loader: Arc<dyn BackgroundLoader> = Arc::new(GatedLoader {
            gate: std::sync::Mutex::new(gate),
        });
        let tool = ToolState::pen(PaletteColor::Red, ToolWidths::default());
        let mut surface = CanvasSurface::new(8, 6);
        let pending = surface.begin_initialize("slow.png", loader);

        assert_eq!(surface.poll_background(&pending), None);
        assert!(!surface.is_ready());
        assert!(!surface.apply_stroke(&[(1.0, 3.0), (7.0, 3.0)], tool));
        assert!(surface.buffer().pixels.iter().all(|b| *b == 255));

        release.send(()).unwrap();
        let mut status = None;
        for _ in 0..500 {
            status = surface.poll_background(&pending);
            if status.is_some() {
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }

        assert!(status.expect("background applied").is_drawn());
        assert!(surface.is_ready());
        assert_eq!(surface.buffer().pixel(4, 3), Color::rgb(0, 128, 0));
        assert!(surface.apply_stroke(&[(1.0, 3.0), (7.0, 3.0)], tool));
        assert_eq!(surface.buffer().pixel(4, 3), PaletteColor::Red.color());
    }
}
