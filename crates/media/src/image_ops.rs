//! Local image helpers.
//!
//! All real transformation happens on the host. Locally we only sniff
//! formats (to label the multipart part and log dimensions) and render the
//! one-pixel base image used for placeholders.

use std::io::Cursor;

use {
    anyhow::{Context, Result, bail},
    image::{ImageFormat, ImageReader, Rgb, RgbImage},
};

/// MIME type sent for buffers whose format cannot be sniffed.
pub const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// Image metadata.
#[derive(Debug, Clone)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    pub format: Option<ImageFormat>,
}

/// Get metadata about an image without fully decoding it.
pub fn get_image_metadata(data: &[u8]) -> Result<ImageMetadata> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .context("failed to guess image format")?;

    let format = reader.format();
    let (width, height) = reader
        .into_dimensions()
        .context("failed to read image dimensions")?;

    Ok(ImageMetadata {
        width,
        height,
        format,
    })
}

/// Guess a MIME type from magic bytes.
pub fn detect_media_type(data: &[u8]) -> &'static str {
    image::guess_format(data)
        .map(|f| f.to_mime_type())
        .unwrap_or(FALLBACK_MEDIA_TYPE)
}

/// Parse `#RRGGBB` into an RGB triple.
pub fn parse_hex_color(value: &str) -> Result<[u8; 3]> {
    mediahost_config::parse_hex_color(value)
        .with_context(|| format!("colour {value:?} must be #RRGGBB"))
}

/// Render a solid-colour PNG.
pub fn solid_png(width: u32, height: u32, rgb: [u8; 3]) -> Result<Vec<u8>> {
    if width == 0 || height == 0 {
        bail!("image dimensions must be non-zero, got {width}x{height}");
    }
    let img = RgbImage::from_pixel(width, height, Rgb(rgb));
    let mut output = Cursor::new(Vec::new());
    img.write_to(&mut output, ImageFormat::Png)
        .context("failed to encode png")?;
    Ok(output.into_inner())
}
