//! Uploaded image validation.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageFormat;

use crate::ai::ImageData;

/// Allowed image formats for uploads.
pub const ALLOWED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::WebP,
];

/// Maximum size of an uploaded file (10MB).
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Validate image data: check size and format, then encode it for the model.
///
/// The format is sniffed from magic bytes; the image is not decoded.
pub fn validate_image(data: &[u8]) -> Result<ImageData, String> {
    if data.is_empty() {
        return Err("Image is empty".to_string());
    }

    if data.len() > MAX_FILE_SIZE {
        return Err(format!(
            "Image too large: {} bytes (max {})",
            data.len(),
            MAX_FILE_SIZE
        ));
    }

    let format = image::guess_format(data).map_err(|_| "Could not detect image format".to_string())?;

    if !ALLOWED_FORMATS.contains(&format) {
        return Err(format!(
            "Unsupported image format: {:?}. Allowed: JPEG, PNG, GIF, WebP",
            format
        ));
    }

    Ok(ImageData::new(format.to_mime_type(), STANDARD.encode(data)))
}
