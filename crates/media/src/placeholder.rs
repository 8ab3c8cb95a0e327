//! Campaign placeholder images.
//!
//! The host does the rendering: we upload a one-pixel PNG in the
//! background colour and ask for it to be filled to the target size with the
//! campaign title overlaid in the centre.

use {
    base64::{Engine as _, engine::general_purpose::STANDARD},
    mediahost_config::PlaceholderStyle,
};

use crate::image_ops::{parse_hex_color, solid_png};

/// Prefix of every placeholder public id.
pub const PUBLIC_ID_PREFIX: &str = "default-ad-";

/// Derive the placeholder public id for a title.
///
/// Every character outside `[A-Za-z0-9]` becomes `-` and the result is
/// lower-cased, so the same title always maps to the same id.
#[must_use]
pub fn placeholder_public_id(title: &str) -> String {
    let slug: String = title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    format!("{PUBLIC_ID_PREFIX}{slug}")
}

/// Escape text for a `l_text:` overlay.
///
/// The text is percent-encoded; commas and slashes are encoded twice
/// because the host splits transformation strings on them before decoding.
#[must_use]
pub fn escape_overlay_text(text: &str) -> String {
    urlencoding::encode(text)
        .replace("%2C", "%252C")
        .replace("%2F", "%252F")
}

/// Build the incoming transformation: fill to size, then lay the title over
/// the centre.
#[must_use]
pub fn placeholder_transformation(title: &str, style: &PlaceholderStyle) -> String {
    let text_color = style.text_color.trim_start_matches('#');
    format!(
        "c_fill,h_{height},w_{width}/co_rgb:{text_color},l_text:{font}_{size}_bold:{text}/fl_layer_apply,g_center",
        height = style.height,
        width = style.width,
        font = escape_overlay_text(&style.font_family),
        size = style.font_size,
        text = escape_overlay_text(title),
    )
}

/// One-pixel PNG in the background colour, as a base64 data URI.
pub fn base_image_data_uri(style: &PlaceholderStyle) -> anyhow::Result<String> {
    let rgb = parse_hex_color(&style.background)?;
    let png = solid_png(1, 1, rgb)?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
}
