//! Fill, clip, and paint helper operations for Canvas2dContext.

use super::Canvas2dContext;
use crate::geometry::RectParams;
use crate::style::FillStyle;
use tiny_skia::Transform;

impl Canvas2dContext {
    // --- Clipping ---

    /// Replace the clipping region with the current path (non-zero winding).
    ///
    /// The region is part of the drawing state, so it is lifted by `restore()`.
    pub fn clip(&mut self) {
        log::debug!(target: "canvas", "clip");
        let path =
            std::mem::replace(&mut self.path_builder, tiny_skia::PathBuilder::new()).finish();
        self.has_current_point = false;

        if let Some(path) = path {
            self.state.clip_path = Some(path);
        }
    }

    // --- Drawing operations ---

    /// Fill the current path using the non-zero winding rule.
    pub fn fill(&mut self) {
        log::debug!(target: "canvas", "fill");
        // Clone the path builder so the path survives for a following clip()
        if let Some(path) = self.path_builder.clone().finish() {
            self.fill_device_path(&path);
        }
    }

    /// Fill a rectangle. The current path is left untouched.
    pub fn fill_rect(&mut self, params: &RectParams) {
        log::debug!(target: "canvas", "fillRect {} {} {} {}", params.x, params.y, params.width, params.height);
        let RectParams {
            x,
            y,
            width,
            height,
        } = *params;
        // Negative sizes extend left/up from the origin
        let Some(rect) = tiny_skia::Rect::from_ltrb(
            x.min(x + width),
            y.min(y + height),
            x.max(x + width),
            y.max(y + height),
        ) else {
            return;
        };
        let path = tiny_skia::PathBuilder::from_rect(rect);
        self.fill_device_path(&path);
    }

    // --- Private paint helpers ---

    fn fill_device_path(&mut self, path: &tiny_skia::Path) {
        let clip_mask = self.create_clip_mask();
        let paint = self.fill_paint();
        self.pixmap.fill_path(
            path,
            &paint,
            tiny_skia::FillRule::Winding,
            Transform::identity(),
            clip_mask.as_ref(),
        );
    }

    pub(crate) fn create_clip_mask(&self) -> Option<tiny_skia::Mask> {
        self.state.clip_path.as_ref().and_then(|clip_path| {
            let mut mask = tiny_skia::Mask::new(self.width, self.height)?;
            mask.fill_path(
                clip_path,
                tiny_skia::FillRule::Winding,
                true,
                Transform::identity(),
            );
            Some(mask)
        })
    }

    pub(crate) fn fill_paint(&self) -> tiny_skia::Paint<'static> {
        let mut paint = tiny_skia::Paint {
            anti_alias: true,
            ..Default::default()
        };
        let FillStyle::Color(mut color) = self.state.fill_style;
        if self.state.global_alpha < 1.0 {
            color.set_alpha((color.alpha() * self.state.global_alpha).clamp(0.0, 1.0));
        }
        paint.set_color(color);
        paint
    }
}
