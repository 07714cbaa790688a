//! Picture cropping ahead of rendering.
//!
//! Produces the fixed-size 4:3 JPEG that the certificate expects for its
//! circular picture slot.

use crate::error::CertgenError;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;

/// Source-pixel rectangle to crop, after rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CropOptions {
    /// Explicit crop region. When absent a centered 4:3 region is chosen.
    pub region: Option<CropRegion>,
    /// Rotation applied before cropping, in degrees. Must be a multiple of 90;
    /// negative values rotate counter-clockwise.
    pub rotate_degrees: i32,
    /// Fraction of the largest centered 4:3 box used by the automatic region.
    pub auto_crop_area: f32,
    pub output_width: u32,
    pub output_height: u32,
    /// JPEG quality, 1..=100.
    pub quality: u8,
}

impl Default for CropOptions {
    fn default() -> Self {
        Self {
            region: None,
            rotate_degrees: 0,
            auto_crop_area: 0.9,
            output_width: 480,
            output_height: 360,
            quality: 92,
        }
    }
}

/// Decode, rotate, crop and resize a picture, returning JPEG bytes.
pub fn crop_picture(bytes: &[u8], options: &CropOptions) -> Result<Vec<u8>, CertgenError> {
    if options.output_width == 0 || options.output_height == 0 {
        return Err(CertgenError::InvalidCrop(
            "output size must be non-zero".to_string(),
        ));
    }
    if !(1..=100).contains(&options.quality) {
        return Err(CertgenError::InvalidCrop(format!(
            "JPEG quality must be in 1..=100, got {}",
            options.quality
        )));
    }

    let image = rotate(image::load_from_memory(bytes)?, options.rotate_degrees)?;
    let region = match options.region {
        Some(region) => check_region(region, image.width(), image.height())?,
        None => auto_region(
            image.width(),
            image.height(),
            options.output_width as f32 / options.output_height as f32,
            options.auto_crop_area,
        ),
    };
    log::debug!(
        "Cropping {}x{} picture to {:?}",
        image.width(),
        image.height(),
        region
    );

    let cropped = image
        .crop_imm(region.x, region.y, region.width, region.height)
        .resize_exact(
            options.output_width,
            options.output_height,
            FilterType::Lanczos3,
        )
        .to_rgb8();

    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, options.quality).encode_image(&cropped)?;
    Ok(buf)
}

fn rotate(image: DynamicImage, degrees: i32) -> Result<DynamicImage, CertgenError> {
    if degrees % 90 != 0 {
        return Err(CertgenError::InvalidCrop(format!(
            "rotation must be a multiple of 90 degrees, got {degrees}"
        )));
    }
    Ok(match (degrees / 90).rem_euclid(4) {
        1 => image.rotate90(),
        2 => image.rotate180(),
        3 => image.rotate270(),
        _ => image,
    })
}

fn check_region(region: CropRegion, width: u32, height: u32) -> Result<CropRegion, CertgenError> {
    let fits = region.width > 0
        && region.height > 0
        && region.x.checked_add(region.width).is_some_and(|r| r <= width)
        && region.y.checked_add(region.height).is_some_and(|b| b <= height);
    if !fits {
        return Err(CertgenError::InvalidCrop(format!(
            "region {region:?} is outside the {width}x{height} picture"
        )));
    }
    Ok(region)
}

/// Largest centered box with the given aspect ratio, shrunk by `area`.
fn auto_region(width: u32, height: u32, aspect: f32, area: f32) -> CropRegion {
    let (w, h) = (width as f32, height as f32);
    let (box_w, box_h) = if w / h > aspect {
        (h * aspect, h)
    } else {
        (w, w / aspect)
    };
    let area = area.clamp(0.0, 1.0);
    let crop_w = ((box_w * area).round() as u32).clamp(1, width);
    let crop_h = ((box_h * area).round() as u32).clamp(1, height);
    CropRegion {
        x: (width - crop_w) / 2,
        y: (height - crop_h) / 2,
        width: crop_w,
        height: crop_h,
    }
}
