use crate::error::ImageLoadError;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// Page text direction. Carried with a request for callers that care; it
/// does not change text alignment, which comes from the layout alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextDirection {
    Ltr,
    #[default]
    Rtl,
}

impl FromStr for TextDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ltr" => Ok(TextDirection::Ltr),
            "rtl" => Ok(TextDirection::Rtl),
            other => Err(format!("unknown text direction {other:?}")),
        }
    }
}

/// Where an image (template or picture) comes from.
#[derive(Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Local file path.
    Path(PathBuf),
    /// `http://` or `https://` URL.
    Url(String),
    /// `data:` URL, usually base64 encoded.
    DataUrl(String),
    /// Encoded image bytes already in memory.
    Bytes(Arc<Vec<u8>>),
}

impl ImageSource {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        ImageSource::Bytes(Arc::new(bytes))
    }

    /// Short human-readable description for log messages.
    pub fn describe(&self) -> String {
        match self {
            ImageSource::Path(path) => path.display().to_string(),
            ImageSource::Url(url) => url.clone(),
            ImageSource::DataUrl(url) => {
                let header = url.split(',').next().unwrap_or_default();
                format!("{header},...")
            }
            ImageSource::Bytes(bytes) => format!("<{} bytes>", bytes.len()),
        }
    }
}

impl fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ImageSource({})", self.describe())
    }
}

impl FromStr for ImageSource {
    type Err = ImageLoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ImageLoadError::InvalidSource(s.to_string()));
        }
        if s.starts_with("data:") {
            return Ok(ImageSource::DataUrl(s.to_string()));
        }
        if s.starts_with("http://") || s.starts_with("https://") {
            return Ok(ImageSource::Url(s.to_string()));
        }
        if s.starts_with("file://") {
            let url =
                reqwest::Url::parse(s).map_err(|_| ImageLoadError::InvalidSource(s.to_string()))?;
            return url
                .to_file_path()
                .map(ImageSource::Path)
                .map_err(|_| ImageLoadError::InvalidSource(s.to_string()));
        }
        Ok(ImageSource::Path(PathBuf::from(s)))
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        ImageSource::Path(path)
    }
}

/// Everything needed to render one certificate.
///
/// Text fields are drawn as given; validation belongs to [`crate::form`].
#[derive(Debug, Clone, Default)]
pub struct RenderRequest {
    pub full_name: String,
    pub class_name: String,
    pub signature: String,
    pub picture: Option<ImageSource>,
    /// Overrides the template configured for the selected layout variant.
    pub template: Option<ImageSource>,
    pub direction: TextDirection,
}

impl RenderRequest {
    pub fn new(
        full_name: impl Into<String>,
        class_name: impl Into<String>,
        signature: impl Into<String>,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            class_name: class_name.into(),
            signature: signature.into(),
            ..Default::default()
        }
    }

    pub fn with_picture(mut self, picture: ImageSource) -> Self {
        self.picture = Some(picture);
        self
    }

    pub fn with_template(mut self, template: ImageSource) -> Self {
        self.template = Some(template);
        self
    }

    pub fn with_direction(mut self, direction: TextDirection) -> Self {
        self.direction = direction;
        self
    }
}
