//! Certificate layout configuration and the runtime-updatable config store.
//!
//! The JSON shape uses camelCase keys (`withPicture.name.fontSize`, ...) so
//! layouts written for the browser version of the tool can be loaded as-is.

use crate::error::ConfigError;
use certgen_canvas2d::{parse_color, parse_font, TextAlign};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

/// Largest canvas side the drawing surface accepts.
pub const MAX_CANVAS_DIMENSION: u32 = 32767;

const DEFAULT_FONT_FAMILY: &str = "\"Segoe UI\", Arial, sans-serif";
const DEFAULT_TEXT_COLOR: &str = "#212121";

/// Which layout variant a render uses. Chosen solely by whether a picture is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutVariant {
    WithPicture,
    WithoutPicture,
}

impl LayoutVariant {
    pub fn for_picture(has_picture: bool) -> Self {
        if has_picture {
            LayoutVariant::WithPicture
        } else {
            LayoutVariant::WithoutPicture
        }
    }
}

/// Horizontal alignment of a text field relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldAlign {
    Left,
    Center,
    #[default]
    Right,
}

impl From<FieldAlign> for TextAlign {
    fn from(value: FieldAlign) -> Self {
        match value {
            FieldAlign::Left => TextAlign::Left,
            FieldAlign::Center => TextAlign::Center,
            FieldAlign::Right => TextAlign::Right,
        }
    }
}

/// Placement and styling of one text field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextFieldConfig {
    pub x: f32,
    pub y: f32,
    pub font_size: f32,
    pub font_family: String,
    pub color: String,
    #[serde(default = "default_font_weight")]
    pub font_weight: u16,
    #[serde(default)]
    pub align: FieldAlign,
}

fn default_font_weight() -> u16 {
    900
}

impl TextFieldConfig {
    fn new(x: f32, y: f32, font_size: f32) -> Self {
        Self {
            x,
            y,
            font_size,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            color: DEFAULT_TEXT_COLOR.to_string(),
            font_weight: default_font_weight(),
            align: FieldAlign::Right,
        }
    }

    /// CSS font shorthand for this field, e.g. `900 150px "Segoe UI", Arial, sans-serif`.
    pub fn css_font(&self) -> String {
        format!("{} {}px {}", self.font_weight, self.font_size, self.font_family)
    }

    fn validate(&self, field: &str) -> Result<(), ConfigError> {
        if !(self.x.is_finite() && self.y.is_finite()) {
            return Err(ConfigError::invalid(field, "anchor must be finite"));
        }
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            return Err(ConfigError::invalid(
                format!("{field}.fontSize"),
                format!("must be positive, got {}", self.font_size),
            ));
        }
        if !(1..=1000).contains(&self.font_weight) {
            return Err(ConfigError::invalid(
                format!("{field}.fontWeight"),
                format!("must be in 1..=1000, got {}", self.font_weight),
            ));
        }
        let parsed = parse_font(&self.css_font())
            .map_err(|e| ConfigError::invalid(format!("{field}.fontFamily"), e.to_string()))?;
        if parsed.size_px != self.font_size {
            return Err(ConfigError::invalid(
                format!("{field}.fontFamily"),
                format!("font string {:?} does not keep fontSize", self.css_font()),
            ));
        }
        parse_color(&self.color)
            .map_err(|e| ConfigError::invalid(format!("{field}.color"), e.to_string()))?;
        Ok(())
    }
}

/// Circular picture placement: clip circle center and radius, plus a zoom factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PicturePlacement {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub scale: f32,
}

impl PicturePlacement {
    fn validate(&self, field: &str) -> Result<(), ConfigError> {
        if !(self.x.is_finite() && self.y.is_finite()) {
            return Err(ConfigError::invalid(field, "center must be finite"));
        }
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(ConfigError::invalid(
                format!("{field}.radius"),
                format!("must be positive, got {}", self.radius),
            ));
        }
        // Below 1.0 the scaled picture would no longer cover the clip circle
        if !(self.scale.is_finite() && self.scale >= 1.0) {
            return Err(ConfigError::invalid(
                format!("{field}.scale"),
                format!("must be at least 1.0, got {}", self.scale),
            ));
        }
        Ok(())
    }
}

/// Layout used when the certificate carries a picture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithPictureLayout {
    pub picture: PicturePlacement,
    pub name: TextFieldConfig,
    pub class: TextFieldConfig,
    pub signature: TextFieldConfig,
}

/// Layout used when the certificate has no picture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithoutPictureLayout {
    pub name: TextFieldConfig,
    pub class: TextFieldConfig,
    pub signature: TextFieldConfig,
}

/// Borrowed view over the fields of one layout variant.
#[derive(Debug, Clone, Copy)]
pub struct VariantLayout<'a> {
    pub name: &'a TextFieldConfig,
    pub class: &'a TextFieldConfig,
    pub signature: &'a TextFieldConfig,
    pub picture: Option<&'a PicturePlacement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: 3579,
            height: 2551,
        }
    }
}

/// Template references per variant. `None` means "use the placeholder background".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateConfig {
    pub with_picture: Option<String>,
    pub without_picture: Option<String>,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            with_picture: Some("templates/with-certificate.jpg".to_string()),
            without_picture: Some("templates/without-certificate.jpg".to_string()),
        }
    }
}

impl TemplateConfig {
    pub fn for_variant(&self, variant: LayoutVariant) -> Option<&str> {
        match variant {
            LayoutVariant::WithPicture => self.with_picture.as_deref(),
            LayoutVariant::WithoutPicture => self.without_picture.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadConfig {
    pub filename_prefix: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            filename_prefix: "شهادة تقدير ل".to_string(),
        }
    }
}

/// Complete certificate configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateConfig {
    pub canvas: CanvasSize,
    pub fallback_color: String,
    pub templates: TemplateConfig,
    pub download: DownloadConfig,
    pub with_picture: WithPictureLayout,
    pub without_picture: WithoutPictureLayout,
}

impl Default for CertificateConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasSize::default(),
            fallback_color: "#f0f0f0".to_string(),
            templates: TemplateConfig::default(),
            download: DownloadConfig::default(),
            with_picture: WithPictureLayout {
                picture: PicturePlacement {
                    x: 3085.0,
                    y: 1045.0,
                    radius: 320.0,
                    scale: 1.1,
                },
                name: TextFieldConfig::new(2100.0, 1325.0, 150.0),
                class: TextFieldConfig::new(2100.0, 1525.0, 150.0),
                signature: TextFieldConfig::new(2980.0, 1910.0, 130.0),
            },
            without_picture: WithoutPictureLayout {
                name: TextFieldConfig::new(2100.0, 1325.0, 150.0),
                class: TextFieldConfig::new(2100.0, 1525.0, 150.0),
                signature: TextFieldConfig::new(2980.0, 1910.0, 130.0),
            },
        }
    }
}

impl CertificateConfig {
    /// Parse a (possibly partial) JSON document and merge it onto the defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let patch: Value = serde_json::from_str(json)?;
        Self::default().merged(patch)
    }

    /// Read a JSON config file and merge it onto the defaults.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Return a copy of this configuration with `patch` deep-merged in and validated.
    ///
    /// Objects merge key by key; any other patch value replaces the current one.
    /// Keys the configuration does not know are ignored.
    pub fn merged(&self, patch: Value) -> Result<Self, ConfigError> {
        let mut current = serde_json::to_value(self)?;
        merge_json(&mut current, patch);
        let merged: CertificateConfig = serde_json::from_value(current)?;
        merged.validate()?;
        Ok(merged)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let CanvasSize { width, height } = self.canvas;
        if !(1..=MAX_CANVAS_DIMENSION).contains(&width)
            || !(1..=MAX_CANVAS_DIMENSION).contains(&height)
        {
            return Err(ConfigError::invalid(
                "canvas",
                format!("dimensions must be in 1..={MAX_CANVAS_DIMENSION}, got {width}x{height}"),
            ));
        }
        parse_color(&self.fallback_color)
            .map_err(|e| ConfigError::invalid("fallbackColor", e.to_string()))?;

        let wp = &self.with_picture;
        wp.picture.validate("withPicture.picture")?;
        wp.name.validate("withPicture.name")?;
        wp.class.validate("withPicture.class")?;
        wp.signature.validate("withPicture.signature")?;

        let np = &self.without_picture;
        np.name.validate("withoutPicture.name")?;
        np.class.validate("withoutPicture.class")?;
        np.signature.validate("withoutPicture.signature")?;
        Ok(())
    }

    pub fn layout(&self, variant: LayoutVariant) -> VariantLayout<'_> {
        match variant {
            LayoutVariant::WithPicture => VariantLayout {
                name: &self.with_picture.name,
                class: &self.with_picture.class,
                signature: &self.with_picture.signature,
                picture: Some(&self.with_picture.picture),
            },
            LayoutVariant::WithoutPicture => VariantLayout {
                name: &self.without_picture.name,
                class: &self.without_picture.class,
                signature: &self.without_picture.signature,
                picture: None,
            },
        }
    }
}

fn merge_json(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                match target.get_mut(&key) {
                    Some(existing) => merge_json(existing, value),
                    // Unknown keys would be dropped on deserialization anyway
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, patch) => *target = patch,
    }
}

/// Shared, runtime-updatable configuration.
///
/// Readers get an immutable snapshot; an update builds a new validated
/// configuration and swaps it in, so renders already in flight keep the
/// snapshot they started with.
#[derive(Debug, Default)]
pub struct ConfigStore {
    current: RwLock<Arc<CertificateConfig>>,
}

impl ConfigStore {
    pub fn new(config: CertificateConfig) -> Self {
        Self {
            current: RwLock::new(Arc::new(config)),
        }
    }

    /// Current configuration. Later updates do not affect the returned value.
    pub fn snapshot(&self) -> Arc<CertificateConfig> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Deep-merge `patch` into the current configuration.
    ///
    /// On a validation error the stored configuration is left unchanged.
    pub fn update(&self, patch: Value) -> Result<Arc<CertificateConfig>, ConfigError> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let updated = Arc::new(guard.merged(patch)?);
        log::info!("Certificate configuration updated");
        *guard = updated.clone();
        Ok(updated)
    }

    /// Replace the configuration wholesale after validating it.
    pub fn replace(&self, config: CertificateConfig) -> Result<(), ConfigError> {
        config.validate()?;
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(config);
        Ok(())
    }
}
