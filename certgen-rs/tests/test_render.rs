use certgen_rs::config::PicturePlacement;
use certgen_rs::serde_json::json;
use certgen_rs::{
    cover_fit, CertgenError, CertificateConfig, CertificateRenderer, ConfigStore, FontConfig,
    ImageSource, RenderRequest, RenderedCertificate,
};
use rstest::rstest;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

const FALLBACK: [u8; 4] = [0xf0, 0xf0, 0xf0, 0xff];
const RED: [u8; 4] = [255, 0, 0, 255];

fn renderer() -> &'static CertificateRenderer {
    static RENDERER: OnceLock<CertificateRenderer> = OnceLock::new();
    RENDERER.get_or_init(CertificateRenderer::new)
}

fn fonts_available() -> bool {
    static AVAILABLE: OnceLock<bool> = OnceLock::new();
    *AVAILABLE.get_or_init(|| FontConfig::default().resolve().face_count() > 0)
}

/// Text pixel assertions need at least one installed font face.
macro_rules! skip_if_no_fonts {
    () => {
        if !fonts_available() {
            eprintln!("Skipping test: no system fonts available");
            return;
        }
    };
}

/// 400x300 layout with the picture circle on the right and text on the left.
fn small_config() -> CertificateConfig {
    let text = json!({
        "name": {"x": 220, "y": 80, "fontSize": 24},
        "class": {"x": 220, "y": 150, "fontSize": 24},
        "signature": {"x": 220, "y": 260, "fontSize": 20}
    });
    let mut with_picture = text.clone();
    with_picture["picture"] = json!({"x": 300, "y": 120, "radius": 60, "scale": 1.1});

    CertificateConfig::default()
        .merged(json!({
            "canvas": {"width": 400, "height": 300},
            "templates": {"withPicture": null, "withoutPicture": null},
            "withPicture": with_picture,
            "withoutPicture": text
        }))
        .unwrap()
}

fn write_png(dir: &Path, name: &str, width: u32, height: u32, rgba: [u8; 4]) -> PathBuf {
    let path = dir.join(name);
    image::RgbaImage::from_pixel(width, height, image::Rgba(rgba))
        .save(&path)
        .unwrap();
    path
}

fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    image::RgbaImage::from_pixel(width, height, image::Rgba(rgba))
        .write_to(&mut buf, image::ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

fn region(cert: &RenderedCertificate, x0: u32, y0: u32, x1: u32, y1: u32) -> Vec<[u8; 4]> {
    (y0..y1)
        .flat_map(|y| (x0..x1).map(move |x| (x, y)))
        .map(|(x, y)| cert.pixel(x, y).unwrap())
        .collect()
}

fn has_non_background(cert: &RenderedCertificate, x0: u32, y0: u32, x1: u32, y1: u32) -> bool {
    region(cert, x0, y0, x1, y1).iter().any(|px| *px != FALLBACK)
}

#[rstest]
#[case::no_template(None, "", "", "")]
#[case::missing_template(Some("/no/such/template.jpg"), "Ahmad", "10", "A.Y.")]
#[case::small_template(Some("tiny"), "", "", "")]
#[case::large_template(Some("large"), "x", "y", "z")]
#[tokio::test]
async fn test_output_has_configured_dimensions(
    #[case] template: Option<&str>,
    #[case] name: &str,
    #[case] class: &str,
    #[case] signature: &str,
) {
    let dir = tempfile::tempdir().unwrap();
    let template = template.map(|t| match t {
        "tiny" => ImageSource::Path(write_png(dir.path(), "t.png", 7, 3, RED)),
        "large" => ImageSource::Path(write_png(dir.path(), "t.png", 900, 700, RED)),
        other => other.parse().unwrap(),
    });

    let mut request = RenderRequest::new(name, class, signature);
    request.template = template;

    let cert = renderer().render(request, &small_config()).await.unwrap();
    assert_eq!((cert.width(), cert.height()), (400, 300));
    assert_eq!(cert.pixels().len(), 400 * 300 * 4);
}

#[tokio::test]
async fn test_missing_template_uses_fallback_fill() {
    let request = RenderRequest::new("", "", "")
        .with_template("/no/such/template.jpg".parse().unwrap());
    let cert = renderer().render(request, &small_config()).await.unwrap();
    assert!(cert.pixels().chunks_exact(4).all(|px| px == FALLBACK));
}

#[tokio::test]
async fn test_custom_fallback_color() {
    let config = small_config()
        .merged(json!({"fallbackColor": "#336699"}))
        .unwrap();
    let cert = renderer()
        .render(RenderRequest::new("", "", ""), &config)
        .await
        .unwrap();
    assert_eq!(cert.pixel(0, 0), Some([0x33, 0x66, 0x99, 0xff]));
    assert_eq!(cert.pixel(399, 299), Some([0x33, 0x66, 0x99, 0xff]));
}

#[tokio::test]
async fn test_template_stretched_to_canvas() {
    let dir = tempfile::tempdir().unwrap();
    let blue = [0, 0, 255, 255];
    let template = write_png(dir.path(), "without.png", 40, 30, blue);
    let config = small_config()
        .merged(json!({"templates": {"withoutPicture": template.to_str().unwrap()}}))
        .unwrap();

    let cert = renderer()
        .render(RenderRequest::new("", "", ""), &config)
        .await
        .unwrap();
    assert!(cert.pixels().chunks_exact(4).all(|px| px == blue));
}

#[tokio::test]
async fn test_request_template_overrides_config() {
    let dir = tempfile::tempdir().unwrap();
    let green = [0, 255, 0, 255];
    let configured = write_png(dir.path(), "configured.png", 10, 10, RED);
    let requested = write_png(dir.path(), "requested.png", 10, 10, green);
    let config = small_config()
        .merged(json!({"templates": {"withoutPicture": configured.to_str().unwrap()}}))
        .unwrap();

    let request = RenderRequest::new("", "", "").with_template(ImageSource::Path(requested));
    let cert = renderer().render(request, &config).await.unwrap();
    assert_eq!(cert.pixel(200, 150), Some(green));
}

/// Every pixel well inside the clip circle must be picture, for any aspect ratio.
#[rstest]
#[case(1200, 800)]
#[case(800, 1200)]
#[case(50, 50)]
#[case(3000, 10)]
#[case(10, 3000)]
#[tokio::test]
async fn test_picture_covers_clip_circle(#[case] width: u32, #[case] height: u32) {
    let request = RenderRequest::new("", "", "")
        .with_picture(ImageSource::from_bytes(png_bytes(width, height, RED)));
    let cert = renderer().render(request, &small_config()).await.unwrap();

    let (cx, cy, r) = (300.0f32, 120.0f32, 60.0f32);
    for y in 0..300u32 {
        for x in 0..400u32 {
            let dist = ((x as f32 + 0.5 - cx).powi(2) + (y as f32 + 0.5 - cy).powi(2)).sqrt();
            let px = cert.pixel(x, y).unwrap();
            if dist < r - 1.5 {
                assert_eq!(px, RED, "uncovered pixel at {x},{y}");
            } else if dist > r + 1.5 {
                assert_eq!(px, FALLBACK, "picture leaked outside clip at {x},{y}");
            }
        }
    }
}

#[test]
fn test_cover_fit_scale_for_1200x800() {
    let config = CertificateConfig::default();
    let placement = config.with_picture.picture;
    let fit = cover_fit(&placement, 1200, 800);

    let expected = placement.scale * (2.0 * placement.radius / 1200.0).max(2.0 * placement.radius / 800.0);
    assert!((fit.scale - expected).abs() < 1e-6);
    assert!((fit.scale - 0.88).abs() < 1e-5);
    assert!((fit.dx + fit.dw / 2.0 - placement.x).abs() < 1e-3);
    assert!((fit.dy + fit.dh / 2.0 - placement.y).abs() < 1e-3);
}

#[test]
fn test_cover_fit_never_leaves_gaps() {
    let placement = PicturePlacement {
        x: 0.0,
        y: 0.0,
        radius: 320.0,
        scale: 1.0,
    };
    for (w, h) in [(1, 1000), (1000, 1), (640, 480), (333, 777)] {
        let fit = cover_fit(&placement, w, h);
        assert!(fit.dw >= 640.0 - 1e-3 && fit.dh >= 640.0 - 1e-3, "{w}x{h}");
    }
}

/// Without a picture the picture area is exactly what the background and text produce.
#[tokio::test]
async fn test_no_picture_leaves_picture_region_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let template = write_png(dir.path(), "t.png", 400, 300, [200, 180, 160, 255]);
    let config = small_config()
        .merged(json!({"templates": {"withoutPicture": template.to_str().unwrap()}}))
        .unwrap();

    let with_text = renderer()
        .render(RenderRequest::new("Ahmad Youssef", "Grade 10", "A.Y."), &config)
        .await
        .unwrap();
    let blank = renderer()
        .render(RenderRequest::new("", "", ""), &config)
        .await
        .unwrap();

    // Bounding box of the withPicture clip circle
    assert_eq!(
        region(&with_text, 240, 60, 360, 180),
        region(&blank, 240, 60, 360, 180)
    );
}

/// Moving one field only changes that field's pixels.
#[tokio::test]
async fn test_field_isolation() {
    skip_if_no_fonts!();

    let base = small_config();
    let moved = base
        .merged(json!({"withoutPicture": {"name": {"x": 390}}}))
        .unwrap();
    let request = RenderRequest::new("Ahmad Youssef", "Grade 10", "A.Y.");

    let a = renderer().render(request.clone(), &base).await.unwrap();
    let b = renderer().render(request, &moved).await.unwrap();

    // Name band differs, the class and signature bands do not
    assert_ne!(region(&a, 0, 40, 400, 95), region(&b, 0, 40, 400, 95));
    assert_eq!(region(&a, 0, 110, 400, 300), region(&b, 0, 110, 400, 300));
}

#[tokio::test]
async fn test_scenario_text_only_with_callback() {
    let config = small_config()
        .merged(json!({"templates": {"withoutPicture": "/missing/without-certificate.jpg"}}))
        .unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let (tx, rx) = std::sync::mpsc::channel();

    let counter = calls.clone();
    renderer()
        .render_with_callback(
            RenderRequest::new("Ahmad Youssef", "Grade 10", "A.Y."),
            &config,
            move |result| {
                counter.fetch_add(1, Ordering::SeqCst);
                tx.send(result).unwrap();
            },
        )
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let cert = rx.recv().unwrap().unwrap();
    assert_eq!((cert.width(), cert.height()), (400, 300));
    assert_eq!(cert.pixel(399, 0), Some(FALLBACK));
    assert_eq!(cert.pixel(0, 299), Some(FALLBACK));
    // Right-aligned text never crosses its anchor
    assert!(!has_non_background(&cert, 224, 0, 400, 300));

    if fonts_available() {
        assert!(has_non_background(&cert, 0, 50, 220, 90));
        assert!(has_non_background(&cert, 0, 120, 220, 160));
        assert!(has_non_background(&cert, 0, 235, 220, 270));
    }
}

#[tokio::test]
async fn test_scenario_with_picture() {
    let request = RenderRequest::new("Ahmad Youssef", "Grade 10", "A.Y.")
        .with_picture(ImageSource::from_bytes(png_bytes(1200, 800, RED)));
    let cert = renderer().render(request, &small_config()).await.unwrap();

    assert_eq!(cert.pixel(300, 120), Some(RED));
    assert_eq!(cert.pixel(300, 62), Some(RED));
    assert_eq!(cert.pixel(300, 178), Some(RED));
    assert_eq!(cert.pixel(242, 120), Some(RED));
    assert_eq!(cert.pixel(358, 120), Some(RED));
    // Corners of the circle's bounding box stay background
    assert_eq!(cert.pixel(245, 65), Some(FALLBACK));
    assert_eq!(cert.pixel(355, 175), Some(FALLBACK));
}

#[tokio::test]
async fn test_bad_picture_is_an_error_and_callback_fires_once() {
    let request = RenderRequest::new("Ahmad", "10", "A.Y.")
        .with_picture(ImageSource::from_bytes(b"not an image".to_vec()));

    let result = renderer().render(request.clone(), &small_config()).await;
    assert!(matches!(result, Err(CertgenError::Picture(_))));

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    renderer()
        .render_with_callback(request, &small_config(), move |result| {
            assert!(result.is_err());
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .await
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_config_store_round_trip() {
    let store = ConfigStore::new(CertificateConfig::default());
    let updated = store
        .update(json!({
            "withPicture": {"picture": {"radius": 300}, "name": {"color": "#000000"}},
            "withoutPicture": {"class": {"fontSize": 140}}
        }))
        .unwrap();
    assert_eq!(*updated, *store.snapshot());

    let config = store.snapshot();
    assert_eq!(config.with_picture.picture.radius, 300.0);
    assert_eq!(config.with_picture.picture.scale, 1.1);
    assert_eq!(config.with_picture.name.color, "#000000");
    assert_eq!(config.with_picture.name.font_size, 150.0);
    assert_eq!(config.without_picture.class.font_size, 140.0);
    assert_eq!(config.without_picture.class.x, 2100.0);
    assert_eq!(config.canvas.width, 3579);
}

#[tokio::test]
async fn test_invalid_config_is_rejected_and_renderer_stays_usable() {
    let renderer = CertificateRenderer::new();
    let mut broken = small_config();
    broken.without_picture.name.font_size = 0.0;

    let result = renderer
        .render(RenderRequest::new("Ahmad", "10", "A.Y."), &broken)
        .await;
    assert!(matches!(result, Err(CertgenError::Config(_))), "{result:?}");

    let (tx, rx) = std::sync::mpsc::channel();
    renderer
        .render_with_callback(RenderRequest::new("Ahmad", "10", "A.Y."), &broken, move |r| {
            tx.send(r.is_err()).unwrap();
        })
        .await
        .unwrap();
    assert!(rx.recv().unwrap());

    let cert = renderer
        .render(RenderRequest::new("Ahmad", "10", "A.Y."), &small_config())
        .await
        .unwrap();
    assert_eq!((cert.width(), cert.height()), (400, 300));
}
