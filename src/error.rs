use std::path::PathBuf;

use thiserror::Error;

use crate::transform::PixelRect;

/// Everything that can go wrong while reviewing a batch of images.
#[derive(Error, Debug)]
pub enum AnnotateError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{} is not a valid directory", .0.display())]
    InvalidPath(PathBuf),

    #[error("there are no image files in {}", .0.display())]
    EmptyDirectory(PathBuf),

    /// Export or zoom requested before any rectangle was drawn.
    #[error("no selection")]
    NoSelection,

    #[error("region {region:?} is empty or outside the {width}x{height} image")]
    InvalidRegion {
        region: PixelRect,
        width: u32,
        height: u32,
    },

    #[error("already zoomed in")]
    AlreadyZoomed,

    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("failed to write {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("bad config file {}: {source}", path.display())]
    Config {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, AnnotateError>;
