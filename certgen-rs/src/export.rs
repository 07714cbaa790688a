//! Encoding rendered certificates and naming the downloaded file.

use crate::error::CertgenError;
use crate::renderer::RenderedCertificate;
use image::codecs::jpeg::JpegEncoder;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpg" | "jpeg" => Ok(ExportFormat::Jpeg),
            other => Err(format!("unsupported export format {other:?}")),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl RenderedCertificate {
    /// Export the certificate as PNG data.
    ///
    /// # Arguments
    /// * `ppi` - Optional pixels per inch for PNG metadata. Defaults to 72 if not specified.
    pub fn to_png(&self, ppi: Option<f32>) -> Result<Vec<u8>, CertgenError> {
        let ppi = ppi.unwrap_or(72.0);

        let mut buf = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut buf, self.width(), self.height());
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);

            // Pixel density metadata is stored as pixels per meter
            let ppm = (ppi.max(0.0) / 0.0254).round() as u32;
            encoder.set_pixel_dims(Some(png::PixelDimensions {
                xppu: ppm,
                yppu: ppm,
                unit: png::Unit::Meter,
            }));

            let mut writer = encoder.write_header()?;
            writer.write_image_data(self.pixels())?;
        }
        Ok(buf)
    }

    /// Export the certificate as JPEG data. Transparent pixels are flattened onto white.
    pub fn to_jpeg(&self, quality: u8) -> Result<Vec<u8>, CertgenError> {
        let quality = quality.clamp(1, 100);
        let rgb: Vec<u8> = self
            .pixels()
            .chunks_exact(4)
            .flat_map(|px| {
                let a = px[3] as u16;
                let blend = |c: u8| ((c as u16 * a + 255 * (255 - a) + 127) / 255) as u8;
                [blend(px[0]), blend(px[1]), blend(px[2])]
            })
            .collect();

        let mut buf = Vec::new();
        JpegEncoder::new_with_quality(&mut buf, quality).encode(
            &rgb,
            self.width(),
            self.height(),
            image::ExtendedColorType::Rgb8,
        )?;
        Ok(buf)
    }

    /// Encode with the given format, using 72 ppi for PNG and quality 92 for JPEG.
    pub fn encode(&self, format: ExportFormat) -> Result<Vec<u8>, CertgenError> {
        match format {
            ExportFormat::Png => self.to_png(None),
            ExportFormat::Jpeg => self.to_jpeg(92),
        }
    }
}

/// File name for a downloaded certificate: `"{prefix} {name} - {class}.{ext}"`.
///
/// Characters that are not allowed in file names on common platforms are
/// replaced with `_`.
pub fn download_filename(
    prefix: &str,
    full_name: &str,
    class_name: &str,
    format: ExportFormat,
) -> String {
    let stem = format!("{} {} - {}", prefix.trim(), full_name.trim(), class_name.trim());
    let sanitized: String = stem
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    format!("{}.{}", sanitized.trim(), format.extension())
}
