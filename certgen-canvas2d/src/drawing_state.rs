//! Drawing state that can be saved and restored.

use crate::font_parser::ParsedFont;
use crate::style::{FillStyle, ImageSmoothingQuality, TextAlign, TextBaseline};

/// Drawing state that can be saved and restored.
#[derive(Debug, Clone)]
pub struct DrawingState {
    /// Current fill style.
    pub fill_style: FillStyle,
    /// Current font specification.
    pub font: ParsedFont,
    /// Current text alignment.
    pub text_align: TextAlign,
    /// Current text baseline.
    pub text_baseline: TextBaseline,
    /// Current global alpha.
    pub global_alpha: f32,
    /// Clipping path in device space (if any).
    pub clip_path: Option<tiny_skia::Path>,
    /// Whether image smoothing is enabled.
    pub image_smoothing_enabled: bool,
    /// Image smoothing quality level.
    pub image_smoothing_quality: ImageSmoothingQuality,
}

impl Default for DrawingState {
    fn default() -> Self {
        Self {
            fill_style: FillStyle::default(),
            font: ParsedFont::default(),
            text_align: TextAlign::default(),
            text_baseline: TextBaseline::default(),
            global_alpha: 1.0,
            clip_path: None,
            image_smoothing_enabled: true,
            image_smoothing_quality: ImageSmoothingQuality::default(),
        }
    }
}
