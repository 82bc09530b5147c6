use thiserror::Error;

/// Failure while watermarking a single file. None of these abort a batch.
#[derive(Debug, Error)]
pub enum WatermarkError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("No capture date found in image metadata")]
    MissingCaptureDate,

    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("Font error: {0}")]
    Font(String),
}
