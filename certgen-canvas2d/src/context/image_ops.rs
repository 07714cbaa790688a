//! Image drawing and pixel data operations for Canvas2dContext.

use super::Canvas2dContext;
use crate::error::{Canvas2dError, Canvas2dResult};
use crate::geometry::CanvasImageDataRef;
use tiny_skia::Transform;

impl Canvas2dContext {
    /// Draw straight-alpha RGBA image data at its natural size.
    pub fn draw_image_data(
        &mut self,
        image: &CanvasImageDataRef<'_>,
        dx: f32,
        dy: f32,
    ) -> Canvas2dResult<()> {
        self.draw_image_data_scaled(image, dx, dy, image.width as f32, image.height as f32)
    }

    /// Draw straight-alpha RGBA image data scaled into the destination rectangle.
    ///
    /// Drawing honors the current clip region, global alpha and smoothing settings.
    /// Non-positive destination sizes draw nothing.
    pub fn draw_image_data_scaled(
        &mut self,
        image: &CanvasImageDataRef<'_>,
        dx: f32,
        dy: f32,
        dw: f32,
        dh: f32,
    ) -> Canvas2dResult<()> {
        log::debug!(
            target: "canvas",
            "drawImage {}x{} -> {} {} {} {}",
            image.width, image.height, dx, dy, dw, dh
        );
        let source = premultiplied_pixmap(image)?;
        if !(dw > 0.0 && dh > 0.0) {
            return Ok(());
        }

        let paint = tiny_skia::PixmapPaint {
            opacity: self.state.global_alpha,
            blend_mode: tiny_skia::BlendMode::SourceOver,
            quality: self.image_filter_quality(),
        };

        let transform = Transform::from_translate(dx, dy)
            .pre_scale(dw / image.width as f32, dh / image.height as f32);

        let clip_mask = self.create_clip_mask();
        self.pixmap.draw_pixmap(
            0,
            0,
            source.as_ref(),
            &paint,
            transform,
            clip_mask.as_ref(),
        );
        Ok(())
    }

    /// Get straight-alpha RGBA data for a region of the canvas.
    ///
    /// Pixels outside the canvas read as transparent black.
    pub fn get_image_data(&self, x: i32, y: i32, width: u32, height: u32) -> Vec<u8> {
        let mut data = vec![0u8; (width as usize) * (height as usize) * 4];
        let src = self.pixmap.data();

        for dy in 0..height {
            let src_y = y + dy as i32;
            if src_y < 0 || src_y >= self.height as i32 {
                continue;
            }
            for dx in 0..width {
                let src_x = x + dx as i32;
                if src_x < 0 || src_x >= self.width as i32 {
                    continue;
                }

                let src_idx = (src_y as usize * self.width as usize + src_x as usize) * 4;
                let dst_idx = (dy as usize * width as usize + dx as usize) * 4;
                let pixel = &src[src_idx..src_idx + 4];

                let a = pixel[3];
                match a {
                    0 => {}
                    255 => data[dst_idx..dst_idx + 4].copy_from_slice(pixel),
                    _ => {
                        let alpha_f = a as f32 / 255.0;
                        data[dst_idx] = (pixel[0] as f32 / alpha_f).round().min(255.0) as u8;
                        data[dst_idx + 1] = (pixel[1] as f32 / alpha_f).round().min(255.0) as u8;
                        data[dst_idx + 2] = (pixel[2] as f32 / alpha_f).round().min(255.0) as u8;
                        data[dst_idx + 3] = a;
                    }
                }
            }
        }

        data
    }

    /// Straight-alpha RGBA data for the whole canvas.
    pub fn to_rgba(&self) -> Vec<u8> {
        self.get_image_data(0, 0, self.width, self.height)
    }
}

/// Copy straight-alpha RGBA into a premultiplied pixmap.
fn premultiplied_pixmap(image: &CanvasImageDataRef<'_>) -> Canvas2dResult<tiny_skia::Pixmap> {
    let expected = (image.width as usize) * (image.height as usize) * 4;
    if image.data.len() != expected {
        return Err(Canvas2dError::InvalidImageData {
            width: image.width,
            height: image.height,
            expected,
            actual: image.data.len(),
        });
    }
    let mut pixmap =
        tiny_skia::Pixmap::new(image.width, image.height).ok_or(Canvas2dError::InvalidImageData {
            width: image.width,
            height: image.height,
            expected,
            actual: image.data.len(),
        })?;

    for (dst, src) in pixmap
        .data_mut()
        .chunks_exact_mut(4)
        .zip(image.data.chunks_exact(4))
    {
        let a = src[3];
        match a {
            255 => dst.copy_from_slice(src),
            0 => dst.copy_from_slice(&[0, 0, 0, 0]),
            _ => {
                // (color * alpha + 127) / 255 for proper rounding
                let a16 = a as u16;
                dst[0] = ((src[0] as u16 * a16 + 127) / 255) as u8;
                dst[1] = ((src[1] as u16 * a16 + 127) / 255) as u8;
                dst[2] = ((src[2] as u16 * a16 + 127) / 255) as u8;
                dst[3] = a;
            }
        }
    }
    Ok(pixmap)
}
