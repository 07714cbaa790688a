use crate::error::ImageLoadError;
use crate::request::ImageSource;
use backon::{ExponentialBuilder, Retryable};
use base64::Engine;
use certgen_canvas2d::CanvasImageDataRef;
use log::{info, warn};
use reqwest::{Client, StatusCode};
use std::path::PathBuf;
use std::time::Duration;

static CERTGEN_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

lazy_static! {
    // Loading runs on its own runtime so callers can drive renders from any executor
    static ref IMAGE_TOKIO_RUNTIME: tokio::runtime::Runtime =
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("certgen-image")
            .enable_all()
            .build()
            .expect("Failed to construct image loading runtime");
    static ref REQWEST_CLIENT: Client = reqwest::ClientBuilder::new()
        .user_agent(CERTGEN_USER_AGENT)
        .build()
        .expect("Failed to construct reqwest client");
}

/// A decoded image as straight-alpha RGBA8 pixels.
#[derive(Clone, PartialEq, Eq)]
pub struct DecodedImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl DecodedImage {
    /// Wrap RGBA8 pixel data. Returns `None` if the length does not match.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if width == 0 || height == 0 || data.len() != (width as usize) * (height as usize) * 4 {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_image_data(&self) -> CanvasImageDataRef<'_> {
        CanvasImageDataRef {
            data: &self.data,
            width: self.width,
            height: self.height,
        }
    }
}

impl std::fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// Fetches and decodes template and picture images.
#[derive(Debug, Clone)]
pub struct ImageLoader {
    timeout: Duration,
    max_retries: usize,
}

impl Default for ImageLoader {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 4,
        }
    }
}

impl ImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Per-request timeout for HTTP sources.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Number of retries on transient HTTP failures.
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Load and decode an image. Decoding runs on a blocking thread.
    pub async fn load(&self, source: &ImageSource) -> Result<DecodedImage, ImageLoadError> {
        let bytes = self.load_bytes(source).await?;
        IMAGE_TOKIO_RUNTIME
            .spawn_blocking(move || decode_image(&bytes))
            .await
            .map_err(|e| ImageLoadError::Task(e.to_string()))?
    }

    /// Load the encoded bytes of an image without decoding them.
    pub async fn load_bytes(&self, source: &ImageSource) -> Result<Vec<u8>, ImageLoadError> {
        info!("Loading image: {}", source.describe());
        match source {
            ImageSource::Bytes(bytes) => Ok(bytes.as_ref().clone()),
            ImageSource::DataUrl(url) => decode_data_url(url),
            ImageSource::Path(path) => {
                let path = path.clone();
                IMAGE_TOKIO_RUNTIME
                    .spawn(read_file(path))
                    .await
                    .map_err(|e| ImageLoadError::Task(e.to_string()))?
            }
            ImageSource::Url(url) => {
                let url = url.clone();
                let timeout = self.timeout;
                let max_retries = self.max_retries;
                IMAGE_TOKIO_RUNTIME
                    .spawn(async move { fetch_http_with_retry(&url, timeout, max_retries).await })
                    .await
                    .map_err(|e| ImageLoadError::Task(e.to_string()))?
            }
        }
    }
}

/// Decode encoded image bytes into RGBA8.
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, ImageLoadError> {
    let image = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = image.dimensions();
    Ok(DecodedImage {
        width,
        height,
        data: image.into_raw(),
    })
}

async fn read_file(path: PathBuf) -> Result<Vec<u8>, ImageLoadError> {
    tokio::fs::read(&path)
        .await
        .map_err(|source| ImageLoadError::Io { path, source })
}

/// Decode the payload of a `data:` URL.
pub(crate) fn decode_data_url(url: &str) -> Result<Vec<u8>, ImageLoadError> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| ImageLoadError::DataUrl("missing data: scheme".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| ImageLoadError::DataUrl("missing ',' separator".to_string()))?;

    if header
        .split(';')
        .any(|param| param.trim().eq_ignore_ascii_case("base64"))
    {
        let cleaned: String = payload
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        base64::engine::general_purpose::STANDARD
            .decode(cleaned)
            .map_err(|e| ImageLoadError::DataUrl(e.to_string()))
    } else {
        Ok(urlencoding::decode_binary(payload.as_bytes()).into_owned())
    }
}

async fn fetch_http(url: &str, timeout: Duration) -> Result<Vec<u8>, ImageLoadError> {
    let response = REQWEST_CLIENT
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|source| ImageLoadError::Http {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ImageLoadError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|source| ImageLoadError::Http {
            url: url.to_string(),
            source,
        })?;
    Ok(bytes.to_vec())
}

async fn fetch_http_with_retry(
    url: &str,
    timeout: Duration,
    max_retries: usize,
) -> Result<Vec<u8>, ImageLoadError> {
    (|| async { fetch_http(url, timeout).await })
        .retry(
            ExponentialBuilder::default()
                .with_min_delay(Duration::from_millis(500))
                .with_max_delay(Duration::from_secs(10))
                .with_max_times(max_retries),
        )
        .when(is_transient)
        .notify(|err, dur| {
            warn!(
                "Retrying image load from {} in {:.1}s: {}",
                url,
                dur.as_secs_f32(),
                err
            );
        })
        .await
}

/// Network errors and 5xx/429 responses are retried; everything else is final.
fn is_transient(err: &ImageLoadError) -> bool {
    match err {
        ImageLoadError::Http { source, .. } => source
            .status()
            .map(|s| s.is_server_error() || s == StatusCode::TOO_MANY_REQUESTS)
            .unwrap_or(true),
        ImageLoadError::HttpStatus { status, .. } => {
            *status >= 500 || *status == StatusCode::TOO_MANY_REQUESTS.as_u16()
        }
        _ => false,
    }
}
