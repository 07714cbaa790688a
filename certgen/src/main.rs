use anyhow::{bail, Context};
use certgen_rs::form::validate_picture;
use certgen_rs::{
    crop_picture, download_filename, CertificateConfig, CertificateForm, CertificateRenderer,
    ConfigStore, CropOptions, CropRegion, ExportFormat, FontConfig, ImageLoader, ImageSource,
    TextDirection,
};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// certgen: render personalized certificate images from a template
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a certificate
    Render(RenderArgs),

    /// Print the effective configuration as JSON
    Config {
        #[command(flatten)]
        config: ConfigArgs,
    },
}

#[derive(Args, Debug)]
struct ConfigArgs {
    /// Path to a JSON layout configuration, merged onto the defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON patch deep-merged onto the configuration (may be repeated)
    #[arg(long = "set", value_name = "JSON")]
    patches: Vec<String>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Full name of the recipient
    #[arg(short, long)]
    name: String,

    /// Class name
    #[arg(short = 'k', long = "class")]
    class_name: String,

    /// Signature text
    #[arg(short, long)]
    signature: String,

    /// Picture to place in the circular slot (selects the withPicture layout)
    #[arg(short, long)]
    picture: Option<PathBuf>,

    /// Crop the picture to 4:3 (480x360 JPEG) before rendering
    #[arg(long)]
    crop: bool,

    /// Explicit crop region as x,y,width,height (implies --crop)
    #[arg(long, value_name = "X,Y,W,H", value_parser = parse_crop_region)]
    crop_region: Option<CropRegion>,

    /// Rotate the picture by this many degrees before cropping (multiple of 90)
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    rotate: i32,

    /// Template override: file path, file:// URL, http(s) URL or data URL
    #[arg(short, long)]
    template: Option<String>,

    #[command(flatten)]
    config: ConfigArgs,

    /// Page text direction, ltr or rtl (does not change alignment)
    #[arg(long, default_value = "rtl")]
    direction: TextDirection,

    /// Output format
    #[arg(short, long, default_value = "png")]
    format: ExportFormat,

    /// Pixels per inch recorded in PNG output
    #[arg(long)]
    ppi: Option<f32>,

    /// JPEG quality (1-100)
    #[arg(long, default_value_t = 92)]
    quality: u8,

    /// Output file. Defaults to the download file name inside --output-dir
    #[arg(short, long, conflicts_with = "output_dir")]
    output: Option<PathBuf>,

    /// Directory for the output file when --output is not given
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Additional directory to load fonts from (may be repeated)
    #[arg(long)]
    font_dir: Vec<PathBuf>,

    /// Do not load system fonts
    #[arg(long)]
    no_system_fonts: bool,

    /// HTTP timeout for remote images, in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,
}

fn parse_crop_region(s: &str) -> Result<CropRegion, String> {
    let parts: Vec<u32> = s
        .split(',')
        .map(|p| p.trim().parse::<u32>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("invalid crop region {s:?}: {e}"))?;
    match parts.as_slice() {
        [x, y, width, height] => Ok(CropRegion {
            x: *x,
            y: *y,
            width: *width,
            height: *height,
        }),
        _ => Err(format!(
            "crop region must have four values x,y,width,height, got {s:?}"
        )),
    }
}

fn load_config(args: &ConfigArgs) -> anyhow::Result<CertificateConfig> {
    let config = match &args.config {
        Some(path) => CertificateConfig::from_path(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => CertificateConfig::default(),
    };

    let store = ConfigStore::new(config);
    for patch in &args.patches {
        let patch: serde_json::Value = serde_json::from_str(patch)
            .with_context(|| format!("Failed to parse --set value as JSON: {patch}"))?;
        store.update(patch)?;
    }
    Ok(store.snapshot().as_ref().clone())
}

fn read_picture(path: &Path) -> anyhow::Result<Vec<u8>> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read picture {}", path.display()))?;
    validate_picture(&bytes).with_context(|| format!("Invalid picture {}", path.display()))?;
    Ok(bytes)
}

async fn render(args: RenderArgs) -> anyhow::Result<()> {
    let config = load_config(&args.config)?;

    let mut form = CertificateForm::new(&args.name, &args.class_name, &args.signature);
    form.direction = args.direction;
    if let Some(path) = &args.picture {
        let bytes = read_picture(path)?;
        if args.crop || args.crop_region.is_some() {
            let options = CropOptions {
                region: args.crop_region,
                rotate_degrees: args.rotate,
                ..Default::default()
            };
            form.cropped_picture = Some(
                crop_picture(&bytes, &options)
                    .with_context(|| format!("Failed to crop picture {}", path.display()))?,
            );
        } else if args.rotate != 0 {
            bail!("--rotate requires --crop or --crop-region");
        }
        form.include_picture = true;
        form.picture = Some(bytes);
    }

    let mut request = form.into_request()?;
    if let Some(template) = &args.template {
        request.template = Some(
            template
                .parse::<ImageSource>()
                .with_context(|| format!("Invalid template reference {template:?}"))?,
        );
    }

    let font_config = FontConfig {
        load_system_fonts: !args.no_system_fonts,
        font_dirs: args.font_dir.clone(),
        ..Default::default()
    };
    let renderer = CertificateRenderer::with_font_config(&font_config)
        .with_loader(ImageLoader::new().with_timeout(Duration::from_secs(args.timeout)));

    let certificate = renderer
        .render(request, &config)
        .await
        .context("Certificate rendering failed")?;

    let bytes = match args.format {
        ExportFormat::Png => certificate.to_png(args.ppi)?,
        ExportFormat::Jpeg => certificate.to_jpeg(args.quality)?,
    };

    let output = match args.output {
        Some(output) => output,
        None => args.output_dir.join(download_filename(
            &config.download.filename_prefix,
            &args.name,
            &args.class_name,
            args.format,
        )),
    };
    std::fs::write(&output, bytes)
        .with_context(|| format!("Failed to write certificate to {}", output.display()))?;

    log::info!(
        "Wrote {}x{} certificate to {}",
        certificate.width(),
        certificate.height(),
        output.display()
    );
    println!("{}", output.display());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Render(args) => render(args).await,
        Commands::Config { config } => {
            let config = load_config(&config)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}
