// Allow uninlined format args for cleaner error messages
#![allow(clippy::uninlined_format_args)]
#![doc = include_str!("../README.md")]

pub mod config;
pub mod crop;
pub mod error;
pub mod export;
pub mod form;
pub mod image_loading;
pub mod renderer;
pub mod request;

#[macro_use]
extern crate lazy_static;

pub use certgen_canvas2d::{FontConfig, GenericFamilyMap};
pub use config::{CertificateConfig, ConfigStore, LayoutVariant};
pub use crop::{crop_picture, CropOptions, CropRegion};
pub use error::{CertgenError, ConfigError, FormError, ImageLoadError};
pub use export::{download_filename, ExportFormat};
pub use form::CertificateForm;
pub use image_loading::{DecodedImage, ImageLoader};
pub use renderer::{cover_fit, CertificateRenderer, CoverFit, RenderedCertificate};
pub use request::{ImageSource, RenderRequest, TextDirection};
pub use serde_json;
