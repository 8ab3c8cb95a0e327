//! Asset descriptors and host request/response types.

use {
    bytes::Bytes,
    mediahost_records::Record,
    serde::{Deserialize, Serialize},
    serde_json::{Map, Value},
};

use crate::error::{Error, HostError, Result};

/// A hosted image. Never mutated: re-uploading produces a new asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub public_id: String,
    /// Permanent HTTPS URL. Always non-empty.
    pub secure_url: String,
    pub folder: String,
    pub format: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub bytes: Option<u64>,
    pub version: Option<u64>,
}

impl Asset {
    /// Validate a raw host response into an asset.
    ///
    /// An absent or empty `secure_url` is [`Error::MissingUrl`]; a URL that
    /// does not parse is reported as an upload failure.
    pub fn from_response(response: UploadResponse, folder: &str) -> Result<Self> {
        let secure_url = match response.secure_url {
            Some(url) if !url.trim().is_empty() => url,
            _ => {
                return Err(Error::MissingUrl {
                    public_id: response.public_id,
                });
            },
        };
        if let Err(e) = url::Url::parse(&secure_url) {
            return Err(Error::upload_failed(
                folder,
                HostError::Decode(format!("malformed secure_url {secure_url:?}: {e}")),
            ));
        }

        Ok(Self {
            public_id: response.public_id,
            secure_url,
            folder: response
                .asset_folder
                .or(response.folder)
                .unwrap_or_else(|| folder.to_string()),
            format: response.format,
            width: response.width,
            height: response.height,
            bytes: response.bytes,
            version: response.version,
        })
    }
}

/// Raw upload acknowledgement as returned by the host.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadResponse {
    pub public_id: String,
    #[serde(default)]
    pub secure_url: Option<String>,
    #[serde(default)]
    pub folder: Option<String>,
    #[serde(default)]
    pub asset_folder: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub bytes: Option<u64>,
    #[serde(default)]
    pub version: Option<u64>,
}

/// Host acknowledgement of a deletion, passed through unmodified.
///
/// `result` is `"ok"` on success and `"not found"` for unknown ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletionResult {
    pub result: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DeletionResult {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.result == "ok"
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.result == "not found"
    }
}

/// What to send as the `file` field.
#[derive(Debug, Clone)]
pub enum UploadSource {
    /// Raw bytes sent as a multipart file part.
    Bytes { data: Bytes, media_type: String },
    /// A `data:` URI sent as a plain form field.
    DataUri(String),
}

impl UploadSource {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Bytes { data, .. } => data.len(),
            Self::DataUri(uri) => uri.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A single upload as understood by a [`crate::MediaHost`].
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub source: UploadSource,
    pub folder: String,
    /// Explicit public id; the host assigns one when `None`.
    pub public_id: Option<String>,
    /// Incoming transformation applied by the host before storing.
    pub transformation: Option<String>,
    /// Target format the host converts to.
    pub format: Option<String>,
}

/// Outcome of [`crate::MediaService::upload_and_persist`].
#[derive(Debug, Clone)]
pub struct PersistedUpload {
    pub asset: Asset,
    pub record: Record,
    pub url: String,
}
