use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_PEN_WIDTH: u32 = 3;
pub const DEFAULT_ERASER_WIDTH: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// The ten pen colors offered by the palette popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaletteColor {
    #[default]
    Black,
    White,
    Red,
    Green,
    Blue,
    Yellow,
    Magenta,
    Cyan,
    DarkOrange,
    SaddleBrown,
}

impl PaletteColor {
    pub const ALL: [PaletteColor; 10] = [
        PaletteColor::Black,
        PaletteColor::White,
        PaletteColor::Red,
        PaletteColor::Green,
        PaletteColor::Blue,
        PaletteColor::Yellow,
        PaletteColor::Magenta,
        PaletteColor::Cyan,
        PaletteColor::DarkOrange,
        PaletteColor::SaddleBrown,
    ];

    pub const fn color(self) -> Color {
        match self {
            PaletteColor::Black => Color::rgb(0x00, 0x00, 0x00),
            PaletteColor::White => Color::rgb(0xff, 0xff, 0xff),
            PaletteColor::Red => Color::rgb(0xff, 0x00, 0x00),
            PaletteColor::Green => Color::rgb(0x00, 0xff, 0x00),
            PaletteColor::Blue => Color::rgb(0x00, 0x00, 0xff),
            PaletteColor::Yellow => Color::rgb(0xff, 0xff, 0x00),
            PaletteColor::Magenta => Color::rgb(0xff, 0x00, 0xff),
            PaletteColor::Cyan => Color::rgb(0x00, 0xff, 0xff),
            PaletteColor::DarkOrange => Color::rgb(0xff, 0x8c, 0x00),
            PaletteColor::SaddleBrown => Color::rgb(0x8b, 0x45, 0x13),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    Pen,
    Eraser,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolWidths {
    pub pen: u32,
    pub eraser: u32,
}

impl Default for ToolWidths {
    fn default() -> Self {
        Self {
            pen: DEFAULT_PEN_WIDTH,
            eraser: DEFAULT_ERASER_WIDTH,
        }
    }
}

/// Resolved tool applied to the next strokes. Already drawn pixels never
/// depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolState {
    pub kind: ToolKind,
    pub color: Color,
    pub width: u32,
}

impl ToolState {
    pub fn select(kind: ToolKind, color: Option<PaletteColor>) -> Result<Self> {
        Self::select_with_widths(kind, color, ToolWidths::default())
    }

    pub fn select_with_widths(
        kind: ToolKind,
        color: Option<PaletteColor>,
        widths: ToolWidths,
    ) -> Result<Self> {
        match kind {
            ToolKind::Pen => {
                let color = color.ok_or(Error::MissingPenColor)?;
                Ok(Self {
                    kind,
                    color: color.color(),
                    width: widths.pen.max(1),
                })
            }
            ToolKind::Eraser => Ok(Self::eraser(widths)),
        }
    }

    pub fn pen(color: PaletteColor, widths: ToolWidths) -> Self {
        Self {
            kind: ToolKind::Pen,
            color: color.color(),
            width: widths.pen.max(1),
        }
    }

    pub fn eraser(widths: ToolWidths) -> Self {
        Self {
            kind: ToolKind::Eraser,
            color: Color::WHITE,
            width: widths.eraser.max(1),
        }
    }
}

impl Default for ToolState {
    fn default() -> Self {
        Self::pen(PaletteColor::default(), ToolWidths::default())
    }
}

/// Tool picker as driven by the toolbar: remembers the last pen color so
/// switching back from the eraser restores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolSelection {
    kind: ToolKind,
    pen_color: PaletteColor,
    widths: ToolWidths,
}

impl ToolSelection {
    pub fn new(widths: ToolWidths) -> Self {
        Self {
            kind: ToolKind::Pen,
            pen_color: PaletteColor::default(),
            widths,
        }
    }

    pub fn choose_tool(&mut self, kind: ToolKind) -> ToolState {
        self.kind = kind;
        self.current()
    }

    /// Picking a swatch always goes back to the pen.
    pub fn choose_color(&mut self, color: PaletteColor) -> ToolState {
        self.pen_color = color;
        self.kind = ToolKind::Pen;
        self.current()
    }

    pub fn current(&self) -> ToolState {
        match self.kind {
            ToolKind::Pen => ToolState::pen(self.pen_color, self.widths),
            ToolKind::Eraser => ToolState::eraser(self.widths),
        }
    }
}

impl Default for ToolSelection {
    fn default() -> Self {
        Self::new(ToolWidths::default())
    }
}

/// Buffer-space point.
pub type CanvasPoint = (f32, f32);

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stroke {
    pub points: Vec<CanvasPoint>,
}
