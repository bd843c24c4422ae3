use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::draw::input::{DevicePoint, DisplayRect, StrokeRecorder};
use crate::draw::model::{PaletteColor, ToolKind, ToolState, ToolWidths};
use crate::draw::surface::CanvasSurface;
use crate::error::Result;

/// Recorded pointer input, replayed through the same down/move/up path as
/// live drawing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StrokeScript {
    #[serde(default)]
    pub strokes: Vec<ScriptedStroke>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptedStroke {
    pub tool: ToolKind,
    #[serde(default)]
    pub color: Option<PaletteColor>,
    /// Where the canvas was shown when the points were captured.
    pub display_rect: DisplayRect,
    /// Device coordinates, `[x, y]`.
    pub points: Vec<[f32; 2]>,
}

impl StrokeScript {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read stroke script {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("parse stroke script {}", path.display()))
    }

    /// Replay every stroke onto `surface`. Returns how many strokes were
    /// painted.
    pub fn replay(&self, surface: &mut CanvasSurface, widths: ToolWidths) -> Result<usize> {
        let mut painted = 0;
        for stroke in &self.strokes {
            let tool = ToolState::select_with_widths(stroke.tool, stroke.color, widths)?;
            let mut recorder = StrokeRecorder::new(tool, stroke.display_rect);
            let mut points = stroke.points.iter().map(|[x, y]| DevicePoint::new(*x, *y));

            let Some(first) = points.next() else {
                continue;
            };
            if !recorder.pointer_down(surface, first) {
                continue;
            }
            for point in points {
                recorder.pointer_move(surface, point);
            }
            if recorder.pointer_leave().is_some() {
                painted += 1;
            }
        }
        tracing::debug!(painted, total = self.strokes.len(), "stroke script replayed");
        Ok(painted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::model::Color;
    use crate::error::Error;

    fn ready_surface() -> CanvasSurface {
        struct Blank;
        impl crate::draw::surface::BackgroundLoader for Blank {
            fn load(&self, source: &str) -> Result<image::RgbaImage> {
                Err(Error::BackgroundLoad {
                    source_ref: source.into(),
                    reason: "none".into(),
                })
            }
        }
        let mut surface = CanvasSurface::new(100, 100);
        surface.initialize("none", &Blank);
        surface
    }

    #[test]
    fn script_strokes_are_mapped_and_painted() {
        let script: StrokeScript = serde_json::from_str(
            r#"{"strokes":[{"tool":"pen","color":"red",
                "display_rect":{"left":0,"top":0,"width":50,"height":50},
                "points":[[5,25],[45,25]]}]}"#,
        )
        .unwrap();

        let mut surface = ready_surface();
        assert_eq!(script.replay(&mut surface, ToolWidths::default()).unwrap(), 1);
        // display is half the buffer size, so x=25 maps to 50
        assert_eq!(surface.buffer().pixel(50, 50), PaletteColor::Red.color());
        assert_eq!(surface.buffer().pixel(50, 20), Color::WHITE);
    }

    #[test]
    fn pen_stroke_without_color_fails() {
        let script = StrokeScript {
            strokes: vec![ScriptedStroke {
                tool: ToolKind::Pen,
                color: None,
                display_rect: DisplayRect::new(0.0, 0.0, 100.0, 100.0),
                points: vec![[1.0, 1.0], [2.0, 2.0]],
            }],
        };
        let mut surface = ready_surface();
        assert!(matches!(
            script.replay(&mut surface, ToolWidths::default()),
            Err(Error::MissingPenColor)
        ));
    }

    #[test]
    fn tiny_display_rect_maps_far_outside_and_still_paints() {
        let script = StrokeScript {
            strokes: vec![ScriptedStroke {
                tool: ToolKind::Pen,
                color: Some(PaletteColor::Blue),
                display_rect: DisplayRect::new(0.0, 0.0, 0.00001, 50.0),
                points: vec![[-1.0, 25.0], [1.0, 25.0]],
            }],
        };
        let mut surface = ready_surface();
        assert_eq!(script.replay(&mut surface, ToolWidths::default()).unwrap(), 1);
        assert_eq!(surface.buffer().pixel(0, 50), PaletteColor::Blue.color());
        assert_eq!(surface.buffer().pixel(99, 50), PaletteColor::Blue.color());
    }
}
