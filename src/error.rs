use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{path}: not a valid .{expected} container")]
    ContainerFormat { path: PathBuf, expected: &'static str },

    #[error("{table}: range {offset:#x}..{end:#x} lies outside the container ({len:#x} bytes)")]
    Bounds {
        table: &'static str,
        offset: u64,
        end: u64,
        len: usize,
    },

    #[error("{table}: index {index} out of range (table holds {count} entries)")]
    IndexOutOfRange {
        table: &'static str,
        index: usize,
        count: usize,
    },

    #[error("layer {layer}: {width}x{height} tiles is larger than a level layer can be")]
    LayerTooLarge { layer: String, width: u64, height: u64 },

    #[error("decompression failed: {0}")]
    Decompression(String),

    #[error("unexpected end of data at offset {offset:#x} (need {need} bytes, have {have})")]
    UnexpectedEof {
        offset: usize,
        need: usize,
        have: usize,
    },

    #[error("string at offset {offset:#x} is not valid UTF-8")]
    InvalidString { offset: usize },

    #[error("invalid scene data: {0}")]
    InvalidScene(String),

    #[error("image error: {0}")]
    Image(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
