use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use slipread_core::ScanConfig;
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

/// File extensions accepted as slip images.
pub const SUPPORTED_EXTENSIONS: &[&str] =
    &["png", "jpg", "jpeg", "webp", "bmp", "gif", "tif", "tiff"];

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Failed to load image: {0}")]
    Load(#[from] image::ImageError),
    #[error("Image has no pixels")]
    Empty,
    #[error("Failed to encode processed image: {0}")]
    Encode(String),
}

/// A slip image ready for both OCR passes, each encoded as PNG.
#[derive(Debug, Clone)]
pub struct PreparedSlip {
    /// The whole enhanced image, read by the fallback pass.
    pub full: Vec<u8>,
    /// The bottom band of the enhanced image, read by the primary pass.
    pub primary: Vec<u8>,
}

pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .is_some_and(|e| SUPPORTED_EXTENSIONS.contains(&e.as_str()))
}

/// Decode raw image bytes (PNG / JPEG / WEBP / …), scale, enhance and crop.
pub fn prepare_slip(data: &[u8], config: &ScanConfig) -> Result<PreparedSlip, PreprocessError> {
    let img = image::load_from_memory(data)?;
    if img.width() == 0 || img.height() == 0 {
        return Err(PreprocessError::Empty);
    }

    let enhanced = enhance(&fit_width(img, config.max_width), config);
    let primary = bottom_crop(&enhanced, config).ok_or(PreprocessError::Empty)?;

    Ok(PreparedSlip {
        full: encode_as_png(DynamicImage::ImageLuma8(enhanced))?,
        primary: encode_as_png(DynamicImage::ImageLuma8(primary))?,
    })
}

/// Scale down to `max_width`, keeping the aspect ratio. Never upscales.
fn fit_width(img: DynamicImage, max_width: u32) -> DynamicImage {
    let (w, h) = (img.width(), img.height());
    if w <= max_width {
        return img;
    }
    let ratio = max_width as f64 / w as f64;
    let nw = ((w as f64 * ratio).round() as u32).max(1);
    let nh = ((h as f64 * ratio).round() as u32).max(1);
    img.resize_exact(nw, nh, image::imageops::FilterType::Triangle)
}

/// Grayscale, contrast boost around mid-gray, then push the extremes to pure
/// black and white.
fn enhance(img: &DynamicImage, config: &ScanConfig) -> GrayImage {
    let rgb = img.to_rgb8();
    ImageBuffer::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        Luma([enhance_value(r, g, b, config)])
    })
}

fn enhance_value(r: u8, g: u8, b: u8, config: &ScanConfig) -> u8 {
    let gray = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    let v = (gray - 128.0) * config.contrast + 128.0 + config.bias;
    let v = if v > config.white_cutoff {
        255.0
    } else if v < config.black_cutoff {
        0.0
    } else {
        v
    };
    v.clamp(0.0, 255.0).round() as u8
}

/// The bottom `primary_bottom_ratio` of the image, at least `min_crop_height`
/// rows tall and never taller than the image.
fn bottom_crop(img: &GrayImage, config: &ScanConfig) -> Option<GrayImage> {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return None;
    }
    let by_ratio = (h as f32 * config.primary_bottom_ratio).round() as u32;
    let crop_h = by_ratio.max(config.min_crop_height).min(h);
    Some(image::imageops::crop_imm(img, 0, h - crop_h, w, crop_h).to_image())
}

fn encode_as_png(img: DynamicImage) -> Result<Vec<u8>, PreprocessError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| PreprocessError::Encode(e.to_string()))?;
    Ok(buf)
}
