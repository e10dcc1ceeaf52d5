//! Image text recognition through the external `tesseract` command.
//!
//! Images are converted to greyscale and enhanced (contrast, then sharpness)
//! before recognition. The enhancement mirrors the usual "enhance by factor"
//! definition: the result is `base + factor * (pixel - base)` where `base` is
//! the mean grey level for contrast and a smoothed copy for sharpness.

use std::ffi::OsString;
use std::path::Path;

use image::{GrayImage, ImageFormat, Luma};
use tracing::{debug, info};

use docscan_core::config::OcrSettings;
use docscan_core::error::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct OcrEngine {
    settings: OcrSettings,
}

impl OcrEngine {
    pub fn new(settings: OcrSettings) -> Self { Self { settings } }

    pub fn extract(&self, path: &Path) -> Result<String> {
        let img = image::open(path).map_err(|e| Error::extraction(path, format!("failed to open image: {}", e)))?;
        let grey = img.to_luma8();
        let enhanced = sharpen(&enhance_contrast(&grey, self.settings.contrast), self.settings.sharpness);

        let tmp = tempfile::Builder::new()
            .prefix("docscan-ocr-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| Error::extraction(path, format!("failed to create temp image: {}", e)))?;
        enhanced
            .save_with_format(tmp.path(), ImageFormat::Png)
            .map_err(|e| Error::extraction(path, format!("failed to write temp image: {}", e)))?;

        let text = self.recognize(tmp.path()).map_err(|e| Error::extraction(path, e))?;
        info!("OCR {}: {} chars", path.display(), text.len());
        Ok(text.trim().to_string())
    }

    fn recognize(&self, image_path: &Path) -> std::result::Result<String, String> {
        let args: Vec<OsString> = vec![
            image_path.as_os_str().to_owned(),
            OsString::from("stdout"),
            OsString::from("-l"),
            OsString::from(&self.settings.language),
        ];
        debug!("Running {} {:?}", self.settings.command, args);
        duct::cmd(&self.settings.command, args)
            .stderr_null()
            .read()
            .map_err(|e| format!("{} failed: {}", self.settings.command, e))
    }
}

/// Stretch grey levels away from the image mean by `factor`.
pub fn enhance_contrast(img: &GrayImage, factor: f32) -> GrayImage {
    let pixels = u64::from(img.width()) * u64::from(img.height());
    if pixels == 0 {
        return img.clone();
    }
    let sum: u64 = img.pixels().map(|p| u64::from(p[0])).sum();
    let mean = (sum as f32 / pixels as f32).round();
    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        Luma([blend(mean, f32::from(img.get_pixel(x, y)[0]), factor)])
    })
}

/// Blend each pixel away from its 3x3 smoothed value by `factor`.
/// Border pixels are left unchanged.
pub fn sharpen(img: &GrayImage, factor: f32) -> GrayImage {
    const KERNEL: [[f32; 3]; 3] = [[1.0, 1.0, 1.0], [1.0, 5.0, 1.0], [1.0, 1.0, 1.0]];
    const WEIGHT: f32 = 13.0;
    let (w, h) = img.dimensions();
    GrayImage::from_fn(w, h, |x, y| {
        let original = f32::from(img.get_pixel(x, y)[0]);
        if x == 0 || y == 0 || x + 1 >= w || y + 1 >= h {
            return Luma([original as u8]);
        }
        let mut acc = 0.0;
        for (dy, row) in KERNEL.iter().enumerate() {
            for (dx, k) in row.iter().enumerate() {
                acc += k * f32::from(img.get_pixel(x + dx as u32 - 1, y + dy as u32 - 1)[0]);
            }
        }
        let smoothed = (acc / WEIGHT).round();
        Luma([blend(smoothed, original, factor)])
    })
}

fn blend(base: f32, value: f32, factor: f32) -> u8 {
    (base + factor * (value - base)).round().clamp(0.0, 255.0) as u8
}
