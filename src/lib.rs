//! Level container converter
//!
//! Reads a compiled level (a `.ltb` tile/geometry container and its `.lvb`
//! object container) and converts it into a tile-engine scene triple or a
//! Tiled map document.

pub mod codec;
pub mod config;
pub mod container;
pub mod convert;
pub mod error;
pub mod hash;
pub mod output;
pub mod property;

pub use config::ConversionConfig;
pub use container::{ObjectContainer, TileContainer};
pub use convert::{Conversion, Converter};
pub use error::{Error, Result};
pub use hash::NameCatalogue;
pub use output::{Scene, SceneBundle, StageConfig, TileConfig, TileMap};
pub use property::{PropertyType, PropertyValue};
