use crate::draw::composite::RgbaBuffer;
use crate::draw::model::{CanvasPoint, Color};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl DirtyRect {
    pub fn from_points(start: CanvasPoint, end: CanvasPoint, pad: f32) -> Self {
        let x0 = to_pixel((start.0.min(end.0) - pad).floor());
        let y0 = to_pixel((start.1.min(end.1) - pad).floor());
        let x1 = to_pixel((start.0.max(end.0) + pad).ceil());
        let y1 = to_pixel((start.1.max(end.1) + pad).ceil());
        Self {
            x: x0,
            y: y0,
            width: (x1 - x0).max(0),
            height: (y1 - y0).max(0),
        }
    }

    pub fn union(self, other: Self) -> Self {
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = self.x.saturating_add(self.width).max(other.x.saturating_add(other.width));
        let y1 = self.y.saturating_add(self.height).max(other.y.saturating_add(other.height));
        Self {
            x: x0,
            y: y0,
            width: x1.saturating_sub(x0),
            height: y1.saturating_sub(y0),
        }
    }

    pub fn clamp(self, width: u32, height: u32) -> Option<Self> {
        let x0 = self.x.max(0);
        let y0 = self.y.max(0);
        let x1 = self.x.saturating_add(self.width).min(width as i32);
        let y1 = self.y.saturating_add(self.height).min(height as i32);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Self {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }
}

/// Bound on rect coordinates; keeps `i32` arithmetic from overflowing.
const PIXEL_LIMIT: f32 = (1 << 28) as f32;

fn to_pixel(value: f32) -> i32 {
    value.clamp(-PIXEL_LIMIT, PIXEL_LIMIT) as i32
}

pub fn stroke_radius(stroke_width: u32) -> f32 {
    stroke_width.max(1) as f32 / 2.0
}

/// Rasterize a path as one continuous line with round caps and joins.
///
/// A pixel is painted when its center lies within `stroke_width / 2` of the
/// polyline. Returns the clamped area that was touched.
pub fn draw_polyline(
    buffer: &mut RgbaBuffer,
    points: &[CanvasPoint],
    color: Color,
    stroke_width: u32,
) -> Option<DirtyRect> {
    match points {
        [] => None,
        [point] => draw_capsule(buffer, *point, *point, color, stroke_width),
        _ => points
            .windows(2)
            .filter_map(|segment| draw_capsule(buffer, segment[0], segment[1], color, stroke_width))
            .reduce(DirtyRect::union),
    }
}

fn draw_capsule(
    buffer: &mut RgbaBuffer,
    start: CanvasPoint,
    end: CanvasPoint,
    color: Color,
    stroke_width: u32,
) -> Option<DirtyRect> {
    let radius = stroke_radius(stroke_width);
    let pad = radius + 1.0;
    // Nothing farther than `pad` outside the buffer can reach a pixel center.
    let (start, end) = clip_segment(
        start,
        end,
        (-pad, -pad),
        (buffer.width as f32 + pad, buffer.height as f32 + pad),
    )?;
    let clip = DirtyRect::from_points(start, end, pad).clamp(buffer.width, buffer.height)?;
    let radius_sq = radius * radius;

    for y in clip.y..(clip.y + clip.height) {
        for x in clip.x..(clip.x + clip.width) {
            let center = (x as f32 + 0.5, y as f32 + 0.5);
            if point_segment_distance_sq(center, start, end) <= radius_sq {
                set_pixel(buffer, x, y, color);
            }
        }
    }
    Some(clip)
}

/// Liang-Barsky clip of a segment against an axis-aligned box. Non-finite
/// points never intersect.
fn clip_segment(
    start: CanvasPoint,
    end: CanvasPoint,
    min: CanvasPoint,
    max: CanvasPoint,
) -> Option<(CanvasPoint, CanvasPoint)> {
    let finite = [start.0, start.1, end.0, end.1].iter().all(|v| v.is_finite());
    if !finite {
        return None;
    }
    let (x0, y0) = (start.0 as f64, start.1 as f64);
    let dx = end.0 as f64 - x0;
    let dy = end.1 as f64 - y0;
    let edges = [
        (-dx, x0 - min.0 as f64),
        (dx, max.0 as f64 - x0),
        (-dy, y0 - min.1 as f64),
        (dy, max.1 as f64 - y0),
    ];

    let (mut t0, mut t1) = (0.0f64, 1.0f64);
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    let at = |t: f64| ((x0 + t * dx) as f32, (y0 + t * dy) as f32);
    Some((at(t0), at(t1)))
}

pub fn point_segment_distance_sq(point: CanvasPoint, start: CanvasPoint, end: CanvasPoint) -> f32 {
    let (px, py) = point;
    let (sx, sy) = start;
    let vx = end.0 - sx;
    let vy = end.1 - sy;
    let len_sq = vx * vx + vy * vy;
    if len_sq <= f32::EPSILON {
        let dx = px - sx;
        let dy = py - sy;
        return dx * dx + dy * dy;
    }
    let t = (((px - sx) * vx + (py - sy) * vy) / len_sq).clamp(0.0, 1.0);
    let cx = sx + t * vx;
    let cy = sy + t * vy;
    let dx = px - cx;
    let dy = py - cy;
    dx * dx + dy * dy
}

fn set_pixel(buffer: &mut RgbaBuffer, x: i32, y: i32, color: Color) {
    if x < 0 || y < 0 || x >= buffer.width as i32 || y >= buffer.height as i32 {
        return;
    }
    let idx = ((y as usize) * (buffer.width as usize) + x as usize) * 4;
    buffer.pixels[idx..idx + 4].copy_from_slice(&[color.r, color.g, color.b, color.a]);
}
