//! Config schema types for the media host client and placeholder rendering.

use std::time::Duration;

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Default Cloudinary API base (cloud name is appended per request).
pub const DEFAULT_API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Folder used by plain uploads when the caller does not pick one.
pub const DEFAULT_UPLOAD_FOLDER: &str = "blog-images";

/// Folder used for generated campaign placeholders.
pub const DEFAULT_PLACEHOLDER_FOLDER: &str = "ad-defaults";

/// Top-level configuration.
///
/// Credentials are optional on purpose: a missing key or secret is not a
/// local error. Requests are still sent and the host rejects them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaHostConfig {
    /// Cloud (account) name, from `CLOUDINARY_CLOUD_NAME` or config.
    pub cloud_name: Option<String>,

    /// API key, from `CLOUDINARY_API_KEY` or config.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_option_secret",
        deserialize_with = "deserialize_option_secret"
    )]
    pub api_key: Option<Secret<String>>,

    /// API secret used to sign requests, from `CLOUDINARY_API_SECRET` or config.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_option_secret",
        deserialize_with = "deserialize_option_secret"
    )]
    pub api_secret: Option<Secret<String>>,

    /// Upload API base URL without the cloud name segment.
    pub api_base: String,

    /// Default folder for `upload`.
    pub upload_folder: String,

    /// Default folder for `generate_placeholder`.
    pub placeholder_folder: String,

    /// Per-request HTTP timeout in seconds.
    pub timeout_secs: u64,

    /// Digest used to sign requests. Must match the account's setting.
    pub signature_algorithm: SignatureAlgorithm,

    /// Look of generated placeholders.
    pub placeholder: PlaceholderStyle,
}

impl Default for MediaHostConfig {
    fn default() -> Self {
        Self {
            cloud_name: None,
            api_key: None,
            api_secret: None,
            api_base: DEFAULT_API_BASE.into(),
            upload_folder: DEFAULT_UPLOAD_FOLDER.into(),
            placeholder_folder: DEFAULT_PLACEHOLDER_FOLDER.into(),
            timeout_secs: 30,
            signature_algorithm: SignatureAlgorithm::default(),
            placeholder: PlaceholderStyle::default(),
        }
    }
}

impl MediaHostConfig {
    /// All three credentials are present and non-empty.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        let non_empty = |s: &Option<Secret<String>>| {
            s.as_ref()
                .is_some_and(|s| !s.expose_secret().trim().is_empty())
        };
        self.cloud_name
            .as_deref()
            .is_some_and(|c| !c.trim().is_empty())
            && non_empty(&self.api_key)
            && non_empty(&self.api_secret)
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Request signing digest.
///
/// Accounts verify SHA-1 signatures unless switched to SHA-256.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureAlgorithm {
    #[default]
    Sha1,
    Sha256,
}

/// Placeholder rendering options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceholderStyle {
    /// Fill colour as `#RRGGBB`.
    pub background: String,
    /// Overlay text colour as `#RRGGBB`.
    pub text_color: String,
    pub font_family: String,
    pub font_size: u32,
    pub width: u32,
    pub height: u32,
}

impl Default for PlaceholderStyle {
    fn default() -> Self {
        Self {
            background: "#4F46E5".into(),
            text_color: "#FFFFFF".into(),
            font_family: "Arial".into(),
            font_size: 60,
            width: 1200,
            height: 630,
        }
    }
}

/// Parse `#RRGGBB` into an RGB triple. Anything else is `None`.
#[must_use]
pub fn parse_hex_color(value: &str) -> Option<[u8; 3]> {
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

// ── Serde helpers for Secret<String> ────────────────────────────────────────

fn serialize_option_secret<S: serde::Serializer>(
    secret: &Option<Secret<String>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(s) => serializer.serialize_some(s.expose_secret()),
        None => serializer.serialize_none(),
    }
}

fn deserialize_option_secret<'de, D: serde::Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Secret<String>>, D::Error> {
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.map(Secret::new))
}
