use serde::{Deserialize, Serialize};

use crate::draw::model::{CanvasPoint, Stroke, ToolState};
use crate::draw::surface::CanvasSurface;

/// Drops pointer samples closer than this (squared, buffer pixels) to the
/// previous one.
const MIN_POINT_DIST_SQ: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DevicePoint {
    pub x: f32,
    pub y: f32,
}

impl DevicePoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// On-screen rectangle the canvas element occupies, in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl DisplayRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn scale_factors(&self, buffer_width: u32, buffer_height: u32) -> (f32, f32) {
        (
            buffer_width as f32 / self.width,
            buffer_height as f32 / self.height,
        )
    }
}

/// Convert a device pointer position into buffer coordinates. Each axis
/// scales on its own; a stretched display is not corrected.
pub fn map_point(
    device: DevicePoint,
    rect: DisplayRect,
    buffer_width: u32,
    buffer_height: u32,
) -> CanvasPoint {
    let (scale_x, scale_y) = rect.scale_factors(buffer_width, buffer_height);
    (
        (device.x - rect.left) * scale_x,
        (device.y - rect.top) * scale_y,
    )
}

/// Pointer down/move/up handling for the drawing pad. Segments are painted
/// onto the surface as they arrive; the finished path is handed back on
/// release for logging only.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeRecorder {
    tool: ToolState,
    display: DisplayRect,
    active: Option<Stroke>,
    pending_tool: Option<ToolState>,
}

impl StrokeRecorder {
    pub fn new(tool: ToolState, display: DisplayRect) -> Self {
        Self {
            tool,
            display,
            active: None,
            pending_tool: None,
        }
    }

    pub fn tool(&self) -> ToolState {
        self.tool
    }

    /// New tool for the next stroke; an in-progress stroke keeps its tool
    /// until it is released.
    pub fn set_tool(&mut self, tool: ToolState) {
        if self.active.is_none() {
            self.tool = tool;
        } else {
            tracing::debug!("tool change deferred until the active stroke ends");
            self.pending_tool = Some(tool);
        }
    }

    pub fn is_drawing(&self) -> bool {
        self.active.is_some()
    }

    pub fn pointer_down(&mut self, surface: &mut CanvasSurface, device: DevicePoint) -> bool {
        if !surface.is_ready() {
            tracing::debug!("pointer down ignored: background not loaded yet");
            return false;
        }
        // Nothing is painted until the pointer moves.
        let point = self.map(surface, device);
        self.active = Some(Stroke {
            points: vec![point],
        });
        true
    }

    pub fn pointer_move(&mut self, surface: &mut CanvasSurface, device: DevicePoint) {
        let point = self.map(surface, device);
        let tool = self.tool;
        let Some(stroke) = self.active.as_mut() else {
            return;
        };
        let Some(last) = stroke.points.last().copied() else {
            return;
        };
        if !should_append_point(last, point) {
            return;
        }
        surface.apply_stroke(&[last, point], tool);
        stroke.points.push(point);
    }

    pub fn pointer_up(&mut self, surface: &mut CanvasSurface, device: DevicePoint) -> Option<Stroke> {
        self.pointer_move(surface, device);
        self.finish()
    }

    /// Leaving the canvas ends the stroke without adding the exit point.
    pub fn pointer_leave(&mut self) -> Option<Stroke> {
        self.finish()
    }

    fn finish(&mut self) -> Option<Stroke> {
        let stroke = self.active.take()?;
        if let Some(tool) = self.pending_tool.take() {
            self.tool = tool;
        }
        tracing::debug!(points = stroke.points.len(), "stroke finished");
        Some(stroke)
    }

    fn map(&self, surface: &CanvasSurface, device: DevicePoint) -> CanvasPoint {
        let (width, height) = surface.size();
        map_point(device, self.display, width, height)
    }
}

fn should_append_point(last: CanvasPoint, next: CanvasPoint) -> bool {
    let dx = next.0 - last.0;
    let dy = next.1 - last.1;
    dx * dx + dy * dy >= MIN_POINT_DIST_SQ
}
