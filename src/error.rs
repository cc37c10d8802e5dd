use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Input directory not found: {}", .0.display())]
    DirectoryMissing(PathBuf),

    #[error("No chapter directories found in {}", .0.display())]
    NoChaptersFound(PathBuf),

    #[error("No page images found in {}", .0.display())]
    NoImagesFound(PathBuf),

    #[error("Image decode error: {0}")]
    ImageDecodeError(String),

    #[error("Segmentation error: {0}")]
    SegmentationError(String),

    #[error("Frame write error: {0}")]
    PersistWriteError(String),

    #[error("Renumber error: {0}")]
    RenumberError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Generates factory methods for [`FrameError`] variants that wrap a `String`.
macro_rules! error_constructors {
    ($(
        $(#[doc = $doc:expr])*
        $method:ident => $variant:ident
    ),* $(,)?) => {
        impl FrameError {
            $(
                $(#[doc = $doc])*
                pub fn $method(msg: impl Into<String>) -> Self {
                    Self::$variant(msg.into())
                }
            )*
        }
    };
}

error_constructors! {
    /// Create a configuration error.
    config => ConfigError,
    /// Create an image decode error.
    image_decode => ImageDecodeError,
    /// Create a segmentation error.
    segmentation => SegmentationError,
    /// Create a frame write error.
    persist_write => PersistWriteError,
    /// Create a renumber error.
    renumber => RenumberError,
}

impl From<serde_json::Error> for FrameError {
    fn from(e: serde_json::Error) -> Self {
        Self::PersistWriteError(e.to_string())
    }
}

impl From<serde_yml::Error> for FrameError {
    fn from(e: serde_yml::Error) -> Self {
        Self::ConfigError(e.to_string())
    }
}

impl From<image::ImageError> for FrameError {
    fn from(e: image::ImageError) -> Self {
        Self::ImageDecodeError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
