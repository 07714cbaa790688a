//! Arc operations using bezier curve approximation.
//!
//! tiny-skia does not support arc primitives directly, so we approximate
//! arcs using cubic bezier curves of at most a quarter turn each.

use crate::geometry::ArcParams;
use std::f32::consts::PI;
use tiny_skia::PathBuilder;

/// Add a circular arc to the path.
///
/// When `connect` is true the arc start is joined to the current point with a
/// straight line (Canvas 2D `arc()` semantics); otherwise a new subpath begins.
/// Sweeps of a full turn or more are clamped to exactly one turn.
pub fn arc(path: &mut PathBuilder, params: &ArcParams, connect: bool) {
    let ArcParams {
        x,
        y,
        radius,
        start_angle,
        end_angle,
        anticlockwise,
    } = *params;

    if radius <= 0.0 || !radius.is_finite() {
        return;
    }

    let full_turn = 2.0 * PI;
    let raw_sweep = if anticlockwise {
        start_angle - end_angle
    } else {
        end_angle - start_angle
    };
    let sweep = if raw_sweep >= full_turn {
        full_turn
    } else {
        raw_sweep.rem_euclid(full_turn)
    };
    let direction = if anticlockwise { -1.0 } else { 1.0 };

    let start_x = x + radius * start_angle.cos();
    let start_y = y + radius * start_angle.sin();
    if connect {
        path.line_to(start_x, start_y);
    } else {
        path.move_to(start_x, start_y);
    }

    if sweep == 0.0 {
        return;
    }

    let num_segments = ((sweep / (PI / 2.0)).ceil() as usize).max(1);
    let segment_angle = direction * sweep / num_segments as f32;

    for i in 0..num_segments {
        let angle1 = start_angle + i as f32 * segment_angle;
        let angle2 = angle1 + segment_angle;
        arc_segment(path, x, y, radius, angle1, angle2);
    }
}

/// Add a single arc segment as a cubic bezier curve.
fn arc_segment(path: &mut PathBuilder, cx: f32, cy: f32, r: f32, angle1: f32, angle2: f32) {
    let k = 4.0 / 3.0 * ((angle2 - angle1) / 4.0).tan();

    let (sin1, cos1) = angle1.sin_cos();
    let (sin2, cos2) = angle2.sin_cos();

    path.cubic_to(
        cx + r * (cos1 - k * sin1),
        cy + r * (sin1 + k * cos1),
        cx + r * (cos2 + k * sin2),
        cy + r * (sin2 - k * cos2),
        cx + r * cos2,
        cy + r * sin2,
    );
}
