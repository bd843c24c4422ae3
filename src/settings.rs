use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::draw::model::{ToolWidths, DEFAULT_ERASER_WIDTH, DEFAULT_PEN_WIDTH};
use crate::draw::surface::{DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH};
use crate::lyrics::DEFAULT_LYRICS_BASE_URL;
use crate::sink::{NotificationSettings, SinkSettings};

pub const DEFAULT_BACKGROUND_IMAGE: &str = "https://i.imgur.com/s0afmCO.png";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Settings {
    #[serde(default = "default_canvas_width")]
    pub canvas_width: u32,
    #[serde(default = "default_canvas_height")]
    pub canvas_height: u32,
    /// URL or local path of the image drawn behind every pass.
    #[serde(default = "default_background_image")]
    pub background_image: String,
    #[serde(default = "default_pen_width")]
    pub pen_width: u32,
    #[serde(default = "default_eraser_width")]
    pub eraser_width: u32,
    /// Where exports go. Defaults to `passes.csv` next to the working directory.
    #[serde(default)]
    pub sink: SinkSettings,
    /// Signing requests are only possible when this is set.
    #[serde(default)]
    pub notification: Option<NotificationSettings>,
    #[serde(default = "default_lyrics_base_url")]
    pub lyrics_base_url: String,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    /// When enabled the application initialises the logger at debug level.
    #[serde(default)]
    pub debug_logging: bool,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

fn default_canvas_width() -> u32 {
    DEFAULT_CANVAS_WIDTH
}

fn default_canvas_height() -> u32 {
    DEFAULT_CANVAS_HEIGHT
}

fn default_background_image() -> String {
    DEFAULT_BACKGROUND_IMAGE.into()
}

fn default_pen_width() -> u32 {
    DEFAULT_PEN_WIDTH
}

fn default_eraser_width() -> u32 {
    DEFAULT_ERASER_WIDTH
}

fn default_lyrics_base_url() -> String {
    DEFAULT_LYRICS_BASE_URL.into()
}

fn default_http_timeout_secs() -> u64 {
    30
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            canvas_width: default_canvas_width(),
            canvas_height: default_canvas_height(),
            background_image: default_background_image(),
            pen_width: default_pen_width(),
            eraser_width: default_eraser_width(),
            sink: SinkSettings::default(),
            notification: None,
            lyrics_base_url: default_lyrics_base_url(),
            http_timeout_secs: default_http_timeout_secs(),
            debug_logging: false,
            log_file: None,
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut settings: Settings =
            serde_json::from_str(&content).with_context(|| format!("parse settings file {path}"))?;
        settings.sanitize();
        Ok(settings)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("write settings file {path}"))?;
        Ok(())
    }

    /// Replace zero sizes with defaults.
    pub fn sanitize(&mut self) {
        if self.canvas_width == 0 || self.canvas_height == 0 {
            tracing::warn!(
                width = self.canvas_width,
                height = self.canvas_height,
                "invalid canvas size; using default"
            );
            self.canvas_width = default_canvas_width();
            self.canvas_height = default_canvas_height();
        }
        if self.pen_width == 0 {
            self.pen_width = default_pen_width();
        }
        if self.eraser_width == 0 {
            self.eraser_width = default_eraser_width();
        }
        if self.http_timeout_secs == 0 {
            self.http_timeout_secs = default_http_timeout_secs();
        }
    }

    pub fn tool_widths(&self) -> ToolWidths {
        ToolWidths {
            pen: self.pen_width,
            eraser: self.eraser_width,
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
