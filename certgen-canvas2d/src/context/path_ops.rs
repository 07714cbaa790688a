//! Path building operations for Canvas2dContext.

use super::Canvas2dContext;
use crate::geometry::{ArcParams, RectParams};

impl Canvas2dContext {
    /// Begin a new path.
    pub fn begin_path(&mut self) {
        log::debug!(target: "canvas", "beginPath");
        self.path_builder = tiny_skia::PathBuilder::new();
        self.has_current_point = false;
    }

    /// Move to a point without drawing.
    pub fn move_to(&mut self, x: f32, y: f32) {
        log::debug!(target: "canvas", "moveTo {} {}", x, y);
        self.path_builder.move_to(x, y);
        self.has_current_point = true;
    }

    /// Draw a line to a point. Without a current point this acts as `move_to`.
    pub fn line_to(&mut self, x: f32, y: f32) {
        log::debug!(target: "canvas", "lineTo {} {}", x, y);
        if self.has_current_point {
            self.path_builder.line_to(x, y);
        } else {
            self.path_builder.move_to(x, y);
            self.has_current_point = true;
        }
    }

    /// Close the current subpath.
    pub fn close_path(&mut self) {
        log::debug!(target: "canvas", "closePath");
        self.path_builder.close();
    }

    /// Add a rectangle to the path as a closed subpath.
    pub fn rect(&mut self, params: &RectParams) {
        log::debug!(target: "canvas", "rect {} {} {} {}", params.x, params.y, params.width, params.height);
        let RectParams {
            x,
            y,
            width,
            height,
        } = *params;
        self.path_builder.move_to(x, y);
        self.path_builder.line_to(x + width, y);
        self.path_builder.line_to(x + width, y + height);
        self.path_builder.line_to(x, y + height);
        self.path_builder.close();
        self.has_current_point = true;
    }

    /// Add an arc to the path.
    pub fn arc(&mut self, params: &ArcParams) {
        log::debug!(target: "canvas", "arc {} {} r={}", params.x, params.y, params.radius);
        crate::arc::arc(&mut self.path_builder, params, self.has_current_point);
        if params.radius > 0.0 {
            self.has_current_point = true;
        }
    }
}
