use crate::config::{CertificateConfig, LayoutVariant, PicturePlacement, TextFieldConfig};
use crate::error::CertgenError;
use crate::image_loading::{DecodedImage, ImageLoader};
use crate::request::{ImageSource, RenderRequest};
use certgen_canvas2d::{ArcParams, Canvas2dContext, FontConfig, RectParams, ResolvedFontConfig};
use futures::channel::{mpsc, mpsc::Sender, oneshot};
use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use std::sync::Arc;
use std::thread;
use std::thread::JoinHandle;

lazy_static! {
    pub static ref TOKIO_RUNTIME: tokio::runtime::Runtime =
        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .expect("Failed to construct certificate renderer runtime");
}

/// A finished certificate: straight-alpha RGBA8 pixels at the configured canvas size.
#[derive(Clone, PartialEq, Eq)]
pub struct RenderedCertificate {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RenderedCertificate {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major RGBA8 pixel data.
    pub fn pixels(&self) -> &[u8] {
        &self.data
    }

    /// RGBA of a single pixel, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let px = &self.data[idx..idx + 4];
        Some([px[0], px[1], px[2], px[3]])
    }

    pub fn into_rgba_image(self) -> Option<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.data)
    }
}

impl std::fmt::Debug for RenderedCertificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderedCertificate")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// Destination rectangle of a cover-fitted picture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverFit {
    pub dx: f32,
    pub dy: f32,
    pub dw: f32,
    pub dh: f32,
    pub scale: f32,
}

/// Scale a `width x height` picture so its shorter side spans the clip
/// diameter (times `placement.scale`) and center it on the clip circle.
pub fn cover_fit(placement: &PicturePlacement, width: u32, height: u32) -> CoverFit {
    let diameter = 2.0 * placement.radius;
    let (w, h) = (width as f32, height as f32);
    let scale = placement.scale * (diameter / w).max(diameter / h);
    let dw = w * scale;
    let dh = h * scale;
    CoverFit {
        dx: placement.x - dw / 2.0,
        dy: placement.y - dh / 2.0,
        dw,
        dh,
        scale,
    }
}

/// Everything the worker needs to draw, with images already decoded.
struct RenderJob {
    config: Arc<CertificateConfig>,
    variant: LayoutVariant,
    full_name: String,
    class_name: String,
    signature: String,
    background: Option<DecodedImage>,
    picture: Option<DecodedImage>,
}

/// Owns the font database and performs the drawing. Lives on the worker thread.
struct InnerRenderer {
    fonts: ResolvedFontConfig,
}

impl InnerRenderer {
    fn draw_certificate(&self, job: RenderJob) -> Result<RenderedCertificate, CertgenError> {
        let config = &job.config;
        let width = config.canvas.width;
        let height = config.canvas.height;
        let mut ctx = Canvas2dContext::with_resolved(width, height, &self.fonts)?;

        // Background: the template stretched to the canvas, or a flat fill
        match &job.background {
            Some(template) => {
                ctx.draw_image_data_scaled(
                    &template.as_image_data(),
                    0.0,
                    0.0,
                    width as f32,
                    height as f32,
                )?;
            }
            None => {
                ctx.set_fill_style(&config.fallback_color)?;
                ctx.fill_rect(&RectParams {
                    x: 0.0,
                    y: 0.0,
                    width: width as f32,
                    height: height as f32,
                });
            }
        }

        let layout = config.layout(job.variant);
        draw_text_field(&mut ctx, &job.full_name, layout.name)?;
        draw_text_field(&mut ctx, &job.class_name, layout.class)?;
        draw_text_field(&mut ctx, &job.signature, layout.signature)?;

        if let (Some(placement), Some(picture)) = (layout.picture, &job.picture) {
            draw_picture(&mut ctx, placement, picture)?;
        }

        Ok(RenderedCertificate {
            width,
            height,
            data: ctx.to_rgba(),
        })
    }
}

fn draw_text_field(
    ctx: &mut Canvas2dContext,
    text: &str,
    field: &TextFieldConfig,
) -> Result<(), CertgenError> {
    ctx.set_font(&field.css_font())?;
    ctx.set_fill_style(&field.color)?;
    ctx.set_text_align(field.align.into());
    ctx.fill_text(text, field.x, field.y);
    Ok(())
}

fn draw_picture(
    ctx: &mut Canvas2dContext,
    placement: &PicturePlacement,
    picture: &DecodedImage,
) -> Result<(), CertgenError> {
    let fit = cover_fit(placement, picture.width(), picture.height());
    debug!(
        "Drawing {}x{} picture at {:.1},{:.1} size {:.1}x{:.1}",
        picture.width(),
        picture.height(),
        fit.dx,
        fit.dy,
        fit.dw,
        fit.dh
    );

    ctx.save();
    ctx.begin_path();
    ctx.arc(&ArcParams::circle(placement.x, placement.y, placement.radius));
    ctx.clip();
    let result =
        ctx.draw_image_data_scaled(&picture.as_image_data(), fit.dx, fit.dy, fit.dw, fit.dh);
    ctx.restore();
    Ok(result?)
}

enum RenderCommand {
    Render {
        job: Box<RenderJob>,
        responder: oneshot::Sender<Result<RenderedCertificate, CertgenError>>,
    },
}

/// Renders certificates on a dedicated worker thread.
///
/// Images are fetched and decoded in the caller's task; drawing happens on
/// the worker, which owns the font database. Renders are processed in the
/// order they are submitted. Cloning shares the same worker.
///
/// # Examples
///
/// ```no_run
/// use certgen_rs::{CertificateConfig, CertificateRenderer, RenderRequest};
///
/// let renderer = CertificateRenderer::new();
/// let request = RenderRequest::new("Ahmad Youssef", "5A", "Ms. Lina");
/// let certificate = futures::executor::block_on(
///     renderer.render(request, &CertificateConfig::default())
/// ).expect("Failed to render certificate");
///
/// assert_eq!(certificate.width(), 3579);
/// ```
#[derive(Clone)]
pub struct CertificateRenderer {
    sender: Sender<RenderCommand>,
    loader: ImageLoader,
    _handle: Arc<JoinHandle<()>>,
}

impl CertificateRenderer {
    /// Create a renderer using system fonts.
    pub fn new() -> Self {
        Self::with_font_config(&FontConfig::default())
    }

    /// Create a renderer with a custom font configuration.
    ///
    /// Fonts are resolved once on the worker thread.
    pub fn with_font_config(font_config: &FontConfig) -> Self {
        let font_config = font_config.clone();
        let (sender, mut receiver) = mpsc::channel::<RenderCommand>(32);

        let handle = Arc::new(thread::spawn(move || {
            let inner = InnerRenderer {
                fonts: font_config.resolve(),
            };
            info!(
                "Certificate renderer ready with {} font faces",
                inner.fonts.face_count()
            );

            while let Some(cmd) = futures::executor::block_on(receiver.next()) {
                match cmd {
                    RenderCommand::Render { job, responder } => {
                        let result = inner.draw_certificate(*job);
                        responder.send(result).ok();
                    }
                }
            }
        }));

        Self {
            sender,
            loader: ImageLoader::default(),
            _handle: handle,
        }
    }

    /// Use a custom image loader (timeouts, retries).
    pub fn with_loader(mut self, loader: ImageLoader) -> Self {
        self.loader = loader;
        self
    }

    /// Render a certificate.
    ///
    /// The configuration is validated first and rejected with
    /// [`CertgenError::Config`]. A template that cannot be loaded falls back to a flat
    /// `fallbackColor` fill. A picture that cannot be loaded fails the render
    /// with [`CertgenError::Picture`].
    pub async fn render(
        &self,
        request: RenderRequest,
        config: &CertificateConfig,
    ) -> Result<RenderedCertificate, CertgenError> {
        self.render_shared(request, Arc::new(config.clone())).await
    }

    /// Render a certificate and hand the outcome to `on_complete`.
    ///
    /// The callback runs exactly once, on a runtime thread, whether the
    /// render succeeds or fails.
    pub fn render_with_callback<F>(
        &self,
        request: RenderRequest,
        config: &CertificateConfig,
        on_complete: F,
    ) -> tokio::task::JoinHandle<()>
    where
        F: FnOnce(Result<RenderedCertificate, CertgenError>) + Send + 'static,
    {
        let renderer = self.clone();
        let config = Arc::new(config.clone());
        TOKIO_RUNTIME.spawn(async move {
            let result = renderer.render_shared(request, config).await;
            on_complete(result);
        })
    }

    async fn render_shared(
        &self,
        request: RenderRequest,
        config: Arc<CertificateConfig>,
    ) -> Result<RenderedCertificate, CertgenError> {
        // The worker must only ever see a validated layout
        config.validate()?;

        let variant = LayoutVariant::for_picture(request.picture.is_some());
        info!(
            "Rendering certificate ({:?}, direction {:?})",
            variant, request.direction
        );

        let background = self.load_background(&request, &config, variant).await;

        let picture = match &request.picture {
            Some(source) => Some(
                self.loader
                    .load(source)
                    .await
                    .map_err(CertgenError::Picture)?,
            ),
            None => None,
        };

        let job = RenderJob {
            config,
            variant,
            full_name: request.full_name,
            class_name: request.class_name,
            signature: request.signature,
            background,
            picture,
        };

        let (resp_tx, resp_rx) = oneshot::channel();
        let cmd = RenderCommand::Render {
            job: Box::new(job),
            responder: resp_tx,
        };

        // Send request
        let mut sender = self.sender.clone();
        if let Err(err) = sender.send(cmd).await {
            return Err(CertgenError::Worker(format!(
                "Failed to send render request: {err}"
            )));
        }

        // Wait for result
        match resp_rx.await {
            Ok(result) => result,
            Err(err) => Err(CertgenError::Worker(format!(
                "Failed to retrieve render result: {err}"
            ))),
        }
    }

    /// Resolve the template, degrading to `None` (flat fill) on any failure.
    async fn load_background(
        &self,
        request: &RenderRequest,
        config: &CertificateConfig,
        variant: LayoutVariant,
    ) -> Option<DecodedImage> {
        let source = match &request.template {
            Some(source) => source.clone(),
            None => match config.templates.for_variant(variant) {
                Some(reference) => match reference.parse::<ImageSource>() {
                    Ok(source) => source,
                    Err(err) => {
                        warn!("Invalid template reference, using placeholder background: {err}");
                        return None;
                    }
                },
                None => {
                    info!("No template configured, using placeholder background");
                    return None;
                }
            },
        };

        match self.loader.load(&source).await {
            Ok(image) => Some(image),
            Err(err) => {
                warn!(
                    "Failed to load template {}, using placeholder background: {err}",
                    source.describe()
                );
                None
            }
        }
    }
}

impl Default for CertificateRenderer {
    fn default() -> Self {
        Self::new()
    }
}
