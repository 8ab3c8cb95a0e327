//! Cloudinary upload API client.
//!
//! Uploads and deletions are signed multipart requests against
//! `{api_base}/{cloud_name}/image/{upload,destroy}`. Missing credentials are
//! not checked locally: the request goes out and the host's authentication
//! error is returned as-is.

use std::collections::BTreeMap;

use {
    async_trait::async_trait,
    mediahost_config::{MediaHostConfig, SignatureAlgorithm},
    reqwest::{
        Client, Response,
        multipart::{Form, Part},
    },
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, de::DeserializeOwned},
    tracing::debug,
};

use crate::{
    asset::{DeletionResult, UploadRequest, UploadResponse, UploadSource},
    error::HostError,
    host::MediaHost,
    signature,
};

/// Cloudinary media host.
#[derive(Clone)]
pub struct CloudinaryHost {
    client: Client,
    cloud_name: String,
    api_key: Option<Secret<String>>,
    api_secret: Option<Secret<String>>,
    signature_algorithm: SignatureAlgorithm,
    base_url: String,
}

impl std::fmt::Debug for CloudinaryHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryHost")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &"[REDACTED]")
            .field("api_secret", &"[REDACTED]")
            .field("signature_algorithm", &self.signature_algorithm)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl CloudinaryHost {
    /// Build a client from configuration. Fails if `api_base` is not a URL
    /// or the HTTP client itself cannot be constructed.
    pub fn from_config(config: &MediaHostConfig) -> Result<Self, HostError> {
        url::Url::parse(&config.api_base).map_err(|e| {
            HostError::Request(format!("invalid api base {:?}: {e}", config.api_base))
        })?;
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            cloud_name: config.cloud_name.clone().unwrap_or_default(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            signature_algorithm: config.signature_algorithm,
            base_url: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{}/{}/image/{action}", self.base_url, self.cloud_name)
    }

    /// Add `timestamp`, `api_key` and `signature` to `params` and turn them
    /// into form fields.
    fn signed_form(&self, mut params: BTreeMap<&'static str, String>) -> Form {
        params.insert(
            "timestamp",
            mediahost_common::time::now_secs().to_string(),
        );
        let secret = self
            .api_secret
            .as_ref()
            .map(|s| s.expose_secret().as_str())
            .unwrap_or_default();
        let signature = signature::sign(&params, secret, self.signature_algorithm);
        let api_key = self
            .api_key
            .as_ref()
            .map(|k| k.expose_secret().clone())
            .unwrap_or_default();

        let mut form = Form::new()
            .text("api_key", api_key)
            .text("signature", signature);
        for (name, value) in params {
            if !value.is_empty() {
                form = form.text(name, value);
            }
        }
        form
    }

    async fn send<T: DeserializeOwned>(&self, action: &str, form: Form) -> Result<T, HostError> {
        let url = self.endpoint(action);
        debug!(%url, "sending media host request");
        let response = self.client.post(&url).multipart(form).send().await?;
        parse_response(response).await
    }
}

#[async_trait]
impl MediaHost for CloudinaryHost {
    fn id(&self) -> &'static str {
        "cloudinary"
    }

    async fn upload(&self, request: UploadRequest) -> Result<UploadResponse, HostError> {
        let mut params = BTreeMap::new();
        params.insert("folder", request.folder);
        params.insert("public_id", request.public_id.unwrap_or_default());
        params.insert("transformation", request.transformation.unwrap_or_default());
        params.insert("format", request.format.unwrap_or_default());

        let form = self.signed_form(params);
        let form = match request.source {
            UploadSource::Bytes { data, media_type } => {
                let part = Part::bytes(data.to_vec())
                    .file_name("upload")
                    .mime_str(&media_type)
                    .map_err(|e| HostError::Request(format!("invalid media type: {e}")))?;
                form.part("file", part)
            },
            UploadSource::DataUri(uri) => form.text("file", uri),
        };

        self.send("upload", form).await
    }

    async fn destroy(&self, public_id: &str) -> Result<DeletionResult, HostError> {
        let mut params = BTreeMap::new();
        params.insert("public_id", public_id.to_string());
        let form = self.signed_form(params);
        self.send("destroy", form).await
    }
}

// ── API Types ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T, HostError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error.message)
            .unwrap_or(body);
        return Err(HostError::Status {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(&body).map_err(|e| HostError::Decode(e.to_string()))
}
