pub mod draw;
pub mod error;
pub mod logging;
pub mod lyrics;
pub mod settings;
pub mod sink;

pub use error::{Error, Result};
