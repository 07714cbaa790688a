//! Pure Rust 2D drawing surface using tiny-skia and cosmic-text.
//!
//! This crate provides the subset of the Canvas 2D API that certificate
//! compositing needs, without a browser or JavaScript runtime:
//! - `tiny-skia` for rasterization, paths and clip masks
//! - `cosmic-text` for text shaping and glyph outlines
//! - `fontdb` for font database management (resolved once, cloned per surface)
//!
//! # Example
//!
//! ```rust,ignore
//! use certgen_canvas2d::{Canvas2dContext, RectParams, TextAlign};
//!
//! let mut ctx = Canvas2dContext::new(400, 300)?;
//! ctx.set_fill_style("#f0f0f0")?;
//! ctx.fill_rect(&RectParams { x: 0.0, y: 0.0, width: 400.0, height: 300.0 });
//! ctx.set_font("900 32px \"Segoe UI\", Arial, sans-serif")?;
//! ctx.set_text_align(TextAlign::Right);
//! ctx.fill_text("Ahmad Youssef", 380.0, 150.0);
//! let rgba = ctx.get_image_data(0, 0, 400, 300);
//! ```

mod arc;
mod context;
mod drawing_state;
mod error;
mod font_config;
mod font_parser;
mod geometry;
mod style;
mod text;

// Re-export public API
pub use context::{parse_color, Canvas2dContext};
pub use drawing_state::DrawingState;
pub use error::{Canvas2dError, Canvas2dResult};
pub use font_config::{CustomFont, FontConfig, GenericFamilyMap, ResolvedFontConfig};
pub use font_parser::{parse_font, ParsedFont};
pub use geometry::{ArcParams, CanvasImageDataRef, RectParams};
pub use style::{FillStyle, ImageSmoothingQuality, TextAlign, TextBaseline};
pub use text::TextMetrics;
