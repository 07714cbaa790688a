// Allow deprecated APIs (assert_cmd::cargo_bin is deprecated but still works)
#![allow(deprecated)]

use assert_cmd::prelude::*; // Add methods on commands
use predicates::prelude::*; // Used for writing assertions
use rstest::rstest;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command; // Run programs
use tempfile::tempdir;

/// Small canvas with no templates so renders are fast and deterministic.
const SMALL_LAYOUT: &str = r##"{
    "canvas": {"width": 320, "height": 240},
    "fallbackColor": "#f0f0f0",
    "templates": {"withPicture": null, "withoutPicture": null},
    "withPicture": {
        "picture": {"x": 240, "y": 100, "radius": 50, "scale": 1.1},
        "name": {"x": 180, "y": 60, "fontSize": 20},
        "class": {"x": 180, "y": 120, "fontSize": 20},
        "signature": {"x": 180, "y": 200, "fontSize": 16}
    },
    "withoutPicture": {
        "name": {"x": 180, "y": 60, "fontSize": 20},
        "class": {"x": 180, "y": 120, "fontSize": 20},
        "signature": {"x": 180, "y": 200, "fontSize": 16}
    }
}"##;

fn write_layout(dir: &Path) -> PathBuf {
    let path = dir.join("layout.json");
    fs::write(&path, SMALL_LAYOUT).unwrap();
    path
}

fn write_png(dir: &Path, name: &str, width: u32, height: u32, rgba: [u8; 4]) -> PathBuf {
    let path = dir.join(name);
    image::RgbaImage::from_pixel(width, height, image::Rgba(rgba))
        .save(&path)
        .unwrap();
    path
}

#[test]
fn test_config_prints_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("certgen")?;
    cmd.arg("config");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"withPicture\""))
        .stdout(predicate::str::contains("\"fontSize\": 150.0"))
        .stdout(predicate::str::contains("templates/with-certificate.jpg"));
    Ok(())
}

#[test]
fn test_config_merges_file_and_set() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let layout = write_layout(dir.path());

    let output = Command::cargo_bin("certgen")?
        .arg("config")
        .arg("--config")
        .arg(&layout)
        .arg("--set")
        .arg(r#"{"withPicture": {"picture": {"radius": 40}}}"#)
        .output()?;
    assert!(output.status.success());

    let config: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(config["canvas"]["width"], 320);
    assert_eq!(config["withPicture"]["picture"]["radius"], 40.0);
    assert_eq!(config["withPicture"]["picture"]["scale"], 1.1);
    assert_eq!(config["withoutPicture"]["name"]["color"], "#212121");
    Ok(())
}

#[rstest]
#[case(r#"{"withPicture": {"picture": {"scale": 0.5}}}"#, "withPicture.picture.scale")]
#[case(r#"{"canvas": {"width": 0}}"#, "canvas")]
#[case("not json", "Failed to parse --set value")]
fn test_config_rejects_invalid_patch(
    #[case] patch: &str,
    #[case] message: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    Command::cargo_bin("certgen")?
        .arg("config")
        .arg("--set")
        .arg(patch)
        .assert()
        .failure()
        .stderr(predicate::str::contains(message));
    Ok(())
}

#[rstest]
#[case("png", "png")]
#[case("jpeg", "jpg")]
fn test_render_to_output_dir(
    #[case] format: &str,
    #[case] extension: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let layout = write_layout(dir.path());

    Command::cargo_bin("certgen")?
        .arg("render")
        .args(["--name", "Ahmad Youssef"])
        .args(["--class", "Grade 10"])
        .args(["--signature", "A.Y."])
        .arg("--config")
        .arg(&layout)
        .args(["--format", format])
        .arg("--output-dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Ahmad Youssef - Grade 10"));

    let expected = dir
        .path()
        .join(format!("شهادة تقدير ل Ahmad Youssef - Grade 10.{extension}"));
    let image = image::open(&expected)?;
    assert_eq!((image.width(), image.height()), (320, 240));
    Ok(())
}

#[test]
fn test_render_missing_template_falls_back() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let layout = write_layout(dir.path());
    let output = dir.path().join("out.png");

    Command::cargo_bin("certgen")?
        .arg("render")
        .args(["-n", "", "-k", "", "-s", ""])
        .arg("--config")
        .arg(&layout)
        .arg("--template")
        .arg(dir.path().join("missing.jpg"))
        .arg("--output")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("full name field is required"));

    Command::cargo_bin("certgen")?
        .arg("render")
        .args(["-n", "A", "-k", "B", "-s", "C"])
        .arg("--config")
        .arg(&layout)
        .arg("--template")
        .arg(dir.path().join("missing.jpg"))
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let image = image::open(&output)?.to_rgba8();
    assert_eq!(image.dimensions(), (320, 240));
    assert_eq!(image.get_pixel(319, 0).0, [0xf0, 0xf0, 0xf0, 0xff]);
    Ok(())
}

#[test]
fn test_render_with_template_and_cropped_picture() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let layout = write_layout(dir.path());
    let template = write_png(dir.path(), "template.png", 64, 48, [0, 0, 255, 255]);
    let picture = write_png(dir.path(), "photo.png", 1200, 800, [255, 0, 0, 255]);
    let output = dir.path().join("with-picture.png");

    Command::cargo_bin("certgen")?
        .arg("render")
        .args(["-n", "Ahmad", "-k", "10", "-s", "A.Y."])
        .arg("--config")
        .arg(&layout)
        .arg("--template")
        .arg(&template)
        .arg("--picture")
        .arg(&picture)
        .arg("--crop")
        .args(["--rotate", "-90"])
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let image = image::open(&output)?.to_rgba8();
    // Circle center shows the picture (JPEG, so allow a little drift)
    let center = image.get_pixel(240, 100).0;
    assert!(center[0] > 230 && center[1] < 25 && center[2] < 25, "{center:?}");
    // Outside the circle the template remains
    assert_eq!(image.get_pixel(5, 5).0, [0, 0, 255, 255]);
    Ok(())
}

#[test]
fn test_render_rejects_non_image_picture() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let layout = write_layout(dir.path());
    let picture = dir.path().join("notes.txt");
    fs::write(&picture, "not a picture")?;

    Command::cargo_bin("certgen")?
        .arg("render")
        .args(["-n", "Ahmad", "-k", "10", "-s", "A.Y."])
        .arg("--config")
        .arg(&layout)
        .arg("--picture")
        .arg(&picture)
        .arg("--output")
        .arg(dir.path().join("out.png"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a recognized image"));
    Ok(())
}

#[test]
fn test_render_rejects_bad_crop_region() -> Result<(), Box<dyn std::error::Error>> {
    Command::cargo_bin("certgen")?
        .arg("render")
        .args(["-n", "A", "-k", "B", "-s", "C"])
        .args(["--crop-region", "1,2,3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("four values"));
    Ok(())
}

#[rstest]
#[case("ltr", "direction Ltr")]
#[case("RTL", "direction Rtl")]
fn test_render_accepts_direction(
    #[case] direction: &str,
    #[case] logged: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let layout = write_layout(dir.path());

    Command::cargo_bin("certgen")?
        .env("RUST_LOG", "info")
        .arg("render")
        .args(["-n", "A", "-k", "B", "-s", "C"])
        .arg("--config")
        .arg(&layout)
        .args(["--direction", direction])
        .arg("--output")
        .arg(dir.path().join("out.png"))
        .assert()
        .success()
        .stderr(predicate::str::contains(logged));
    Ok(())
}

#[test]
fn test_render_defaults_to_rtl() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let layout = write_layout(dir.path());

    Command::cargo_bin("certgen")?
        .env("RUST_LOG", "info")
        .arg("render")
        .args(["-n", "A", "-k", "B", "-s", "C"])
        .arg("--config")
        .arg(&layout)
        .arg("--output")
        .arg(dir.path().join("out.png"))
        .assert()
        .success()
        .stderr(predicate::str::contains("direction Rtl"));

    Command::cargo_bin("certgen")?
        .arg("render")
        .args(["-n", "A", "-k", "B", "-s", "C"])
        .args(["--direction", "sideways"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown text direction"));
    Ok(())
}
