use certgen_canvas2d::Canvas2dError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while rendering or exporting a certificate.
#[derive(Debug, Error)]
pub enum CertgenError {
    #[error("canvas error: {0}")]
    Canvas(#[from] Canvas2dError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The picture could not be loaded or decoded. The template failing is not
    /// an error (the renderer falls back to a flat fill), but a missing picture is.
    #[error("failed to load picture: {0}")]
    Picture(#[source] ImageLoadError),

    #[error("invalid form input: {0}")]
    Form(#[from] FormError),

    #[error("invalid crop: {0}")]
    InvalidCrop(String),

    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),

    #[error("PNG encoding error: {0}")]
    Png(#[from] png::EncodingError),

    #[error("render worker unavailable: {0}")]
    Worker(String),
}

/// Configuration loading, merging and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{field}: {reason}")]
    Invalid { field: String, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Failures while fetching or decoding an image.
#[derive(Debug, Error)]
pub enum ImageLoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} returned status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("invalid image reference {0:?}")]
    InvalidSource(String),

    #[error("invalid data URL: {0}")]
    DataUrl(String),

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("image loading task failed: {0}")]
    Task(String),
}

/// Certificate form validation failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("the {0} field is required")]
    MissingField(&'static str),

    #[error("picture is {size} bytes, the limit is {max} bytes")]
    PictureTooLarge { size: usize, max: usize },

    #[error("picture is not a recognized image file")]
    NotAnImage,
}
