use crate::draw::model::Color;
use image::imageops::FilterType;
use image::RgbaImage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RgbaBuffer {
    pub fn new(width: u32, height: u32, fill: Color) -> Self {
        let mut buffer = Self {
            width,
            height,
            pixels: vec![0u8; (width as usize) * (height as usize) * 4],
        };
        buffer.fill(fill);
        buffer
    }

    pub fn fill(&mut self, color: Color) {
        for chunk in self.pixels.chunks_exact_mut(4) {
            chunk.copy_from_slice(&[color.r, color.g, color.b, color.a]);
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Color {
        let idx = ((y as usize) * (self.width as usize) + x as usize) * 4;
        Color {
            r: self.pixels[idx],
            g: self.pixels[idx + 1],
            b: self.pixels[idx + 2],
            a: self.pixels[idx + 3],
        }
    }

    pub fn to_image(&self) -> RgbaImage {
        // Length always matches the dimensions.
        RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
            .unwrap_or_else(|| RgbaImage::new(self.width, self.height))
    }
}

/// Where a background lands inside the buffer, in buffer pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Placement {
    /// Whole-pixel rectangle `(x, y, width, height)` clamped to the buffer.
    pub fn pixel_rect(&self, buffer_width: u32, buffer_height: u32) -> (u32, u32, u32, u32) {
        let x0 = self.x.round().clamp(0.0, buffer_width as f64) as u32;
        let y0 = self.y.round().clamp(0.0, buffer_height as f64) as u32;
        let x1 = (self.x + self.width).round().clamp(0.0, buffer_width as f64) as u32;
        let y1 = (self.y + self.height).round().clamp(0.0, buffer_height as f64) as u32;
        (x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0))
    }
}

/// Scale an image to fit the buffer without distortion and center it.
pub fn letterbox(buffer_width: u32, buffer_height: u32, image_width: u32, image_height: u32) -> Placement {
    let bw = buffer_width as f64;
    let bh = buffer_height as f64;
    let image_aspect = image_width as f64 / image_height as f64;

    let (width, height) = if bw / bh > image_aspect {
        (bh * image_aspect, bh)
    } else {
        (bw, bw / image_aspect)
    };

    Placement {
        x: (bw - width) / 2.0,
        y: (bh - height) / 2.0,
        width,
        height,
    }
}

/// Fill the buffer white and draw `image` letterboxed on top.
pub fn draw_background(buffer: &mut RgbaBuffer, image: &RgbaImage) -> Option<Placement> {
    buffer.fill(Color::WHITE);
    if image.width() == 0 || image.height() == 0 || buffer.width == 0 || buffer.height == 0 {
        return None;
    }

    let placement = letterbox(buffer.width, buffer.height, image.width(), image.height());
    let (x0, y0, w, h) = placement.pixel_rect(buffer.width, buffer.height);
    if w == 0 || h == 0 {
        return Some(placement);
    }

    let scaled = if (w, h) == image.dimensions() {
        image.clone()
    } else {
        image::imageops::resize(image, w, h, FilterType::Triangle)
    };

    for (sx, sy, src) in scaled.enumerate_pixels() {
        let (x, y) = (x0 + sx, y0 + sy);
        if x >= buffer.width || y >= buffer.height {
            continue;
        }
        let idx = ((y as usize) * (buffer.width as usize) + x as usize) * 4;
        let dst = &mut buffer.pixels[idx..idx + 4];
        let blended = blend_pixel(
            Color::rgba(dst[0], dst[1], dst[2], dst[3]),
            Color::rgba(src[0], src[1], src[2], src[3]),
        );
        dst.copy_from_slice(&[blended.r, blended.g, blended.b, blended.a]);
    }

    Some(placement)
}

fn blend_pixel(bottom: Color, top: Color) -> Color {
    let sa = top.a as f32 / 255.0;
    let da = bottom.a as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);

    if out_a <= f32::EPSILON {
        return Color::rgba(0, 0, 0, 0);
    }

    let blend = |s: u8, d: u8| -> u8 {
        (((s as f32 * sa) + (d as f32 * da * (1.0 - sa))) / out_a)
            .round()
            .clamp(0.0, 255.0) as u8
    };

    Color {
        r: blend(top.r, bottom.r),
        g: blend(top.g, bottom.g),
        b: blend(top.b, bottom.b),
        a: (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    }
}
