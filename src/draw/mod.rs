pub mod composite;
pub mod input;
pub mod model;
pub mod render;
pub mod save;
pub mod script;
pub mod state;
pub mod surface;

pub use input::{map_point, DevicePoint, DisplayRect, StrokeRecorder};
pub use model::{PaletteColor, ToolKind, ToolSelection, ToolState};
pub use save::{export, ExportOutcome, ExportSession, SubmissionRecord};
pub use surface::{BackgroundLoader, BackgroundStatus, CanvasSurface, DefaultLoader};
