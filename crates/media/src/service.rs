//! The four media operations, sequenced over a [`MediaHost`] and a
//! [`RecordStore`].

use std::sync::Arc;

use {
    bytes::Bytes,
    mediahost_config::{MediaHostConfig, PlaceholderStyle},
    mediahost_records::{MEDIA_URL_FIELD, RecordStore},
    serde_json::{Map, Value},
    tracing::{debug, info, warn},
};

#[cfg(feature = "metrics")]
use mediahost_metrics::{counter, histogram, labels, media as media_metrics};

use crate::{
    asset::{Asset, DeletionResult, PersistedUpload, UploadRequest, UploadSource},
    cloudinary::CloudinaryHost,
    error::{Error, Result},
    host::MediaHost,
    image_ops, placeholder,
};

/// Longest side limits applied by the host on upload.
pub const MAX_WIDTH: u32 = 1200;
pub const MAX_HEIGHT: u32 = 630;

/// Format every upload is converted to.
pub const TARGET_FORMAT: &str = "webp";

/// Entry point for uploads, record updates, deletions and placeholders.
///
/// Holds no mutable state. Concurrent calls are independent and may race
/// at the host (e.g. two placeholders for the same title).
#[derive(Clone)]
pub struct MediaService {
    host: Arc<dyn MediaHost>,
    records: Arc<dyn RecordStore>,
    upload_folder: String,
    placeholder_folder: String,
    placeholder_style: PlaceholderStyle,
}

impl std::fmt::Debug for MediaService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaService")
            .field("host", &self.host.id())
            .field("upload_folder", &self.upload_folder)
            .field("placeholder_folder", &self.placeholder_folder)
            .finish_non_exhaustive()
    }
}

impl MediaService {
    pub fn new(
        host: Arc<dyn MediaHost>,
        records: Arc<dyn RecordStore>,
        config: &MediaHostConfig,
    ) -> Self {
        Self {
            host,
            records,
            upload_folder: config.upload_folder.clone(),
            placeholder_folder: config.placeholder_folder.clone(),
            placeholder_style: config.placeholder.clone(),
        }
    }

    /// Build a service backed by [`CloudinaryHost`].
    ///
    /// A client that cannot be built from `config` is [`Error::InvalidInput`].
    pub fn from_config(config: &MediaHostConfig, records: Arc<dyn RecordStore>) -> Result<Self> {
        let host = CloudinaryHost::from_config(config)
            .map_err(|e| Error::invalid_input(format!("media host client: {e}")))?;
        Ok(Self::new(Arc::new(host), records, config))
    }

    /// Upload an image, bounded to 1200×630 and converted to webp.
    ///
    /// `folder` defaults to the configured upload folder (`blog-images`).
    /// An empty buffer fails with [`Error::InvalidInput`] before any request
    /// is made. The returned asset always has a non-empty secure URL.
    pub async fn upload(&self, buffer: Bytes, folder: Option<&str>) -> Result<Asset> {
        let folder = folder.unwrap_or(&self.upload_folder);
        if buffer.is_empty() {
            record_upload_error(folder, "invalid_input");
            return Err(Error::invalid_input("image buffer is empty"));
        }

        let media_type = image_ops::detect_media_type(&buffer);
        match image_ops::get_image_metadata(&buffer) {
            Ok(meta) => debug!(
                folder,
                media_type,
                width = meta.width,
                height = meta.height,
                bytes = buffer.len(),
                "uploading image"
            ),
            // The host decides what it accepts.
            Err(e) => debug!(folder, media_type, error = %e, "uploading unrecognised buffer"),
        }

        let request = UploadRequest {
            source: UploadSource::Bytes {
                data: buffer,
                media_type: media_type.to_string(),
            },
            folder: folder.to_string(),
            public_id: None,
            transformation: Some(format!("c_limit,h_{MAX_HEIGHT},w_{MAX_WIDTH}/q_auto")),
            format: Some(TARGET_FORMAT.to_string()),
        };
        self.send_upload(request).await
    }

    /// Upload an image and store its URL on an existing record.
    ///
    /// The record receives `{ "mediaUrl": url }` merged with `extra_fields`
    /// in a single validated update; `mediaUrl` always wins over a
    /// same-named extra field.
    ///
    /// If the upload succeeds but the record update fails, the asset stays
    /// on the host. The failure is logged with the orphaned public id and
    /// returned unchanged; cleaning up is the caller's job.
    pub async fn upload_and_persist(
        &self,
        buffer: Bytes,
        folder: Option<&str>,
        record_type: &str,
        record_id: &str,
        extra_fields: Map<String, Value>,
    ) -> Result<PersistedUpload> {
        // `upload` only returns assets with a non-empty secure URL.
        let asset = self.upload(buffer, folder).await?;
        let url = asset.secure_url.clone();

        let mut fields = extra_fields;
        fields.insert(MEDIA_URL_FIELD.to_string(), Value::String(url.clone()));

        let outcome = self
            .records
            .find_and_update_by_id(record_type, record_id, fields)
            .await;
        let record = match outcome {
            Ok(Some(record)) => record,
            Ok(None) => {
                let err = Error::record_not_found(record_type, record_id);
                log_orphaned_asset(&asset, record_type, record_id, &err);
                return Err(err);
            },
            Err(source) => {
                let err = Error::Record {
                    record_type: record_type.to_string(),
                    id: record_id.to_string(),
                    source,
                };
                log_orphaned_asset(&asset, record_type, record_id, &err);
                return Err(err);
            },
        };

        info!(
            public_id = %asset.public_id,
            record_type,
            record_id,
            "attached uploaded image to record"
        );
        Ok(PersistedUpload { asset, record, url })
    }

    /// Delete an asset by public id.
    ///
    /// No local existence check: the host's acknowledgement (including
    /// `"not found"`) is returned unmodified. Records pointing at the asset
    /// are left alone.
    pub async fn delete(&self, public_id: &str) -> Result<DeletionResult> {
        if public_id.trim().is_empty() {
            return Err(Error::invalid_input("public id is empty"));
        }

        let result = self
            .host
            .destroy(public_id)
            .await
            .map_err(|e| Error::deletion_failed(public_id, e))?;

        #[cfg(feature = "metrics")]
        counter!(media_metrics::DELETIONS_TOTAL, labels::RESULT => result.result.clone())
            .increment(1);

        info!(public_id, result = %result.result, "deleted asset");
        Ok(result)
    }

    /// Upload a labeled placeholder for a campaign and return its URL.
    ///
    /// The public id is derived from the title (see
    /// [`placeholder::placeholder_public_id`]), so repeated calls target the
    /// same id. Whether the host overwrites or versions is up to the host.
    pub async fn generate_placeholder(&self, title: &str, folder: Option<&str>) -> Result<String> {
        let folder = folder.unwrap_or(&self.placeholder_folder);
        if title.trim().is_empty() {
            return Err(Error::invalid_input("placeholder title is empty"));
        }

        let public_id = placeholder::placeholder_public_id(title);
        let base_image = placeholder::base_image_data_uri(&self.placeholder_style)
            .map_err(|e| Error::invalid_input(format!("placeholder style: {e:#}")))?;

        let request = UploadRequest {
            source: UploadSource::DataUri(base_image),
            folder: folder.to_string(),
            public_id: Some(public_id.clone()),
            transformation: Some(placeholder::placeholder_transformation(
                title,
                &self.placeholder_style,
            )),
            format: None,
        };
        let asset = self.send_upload(request).await?;

        #[cfg(feature = "metrics")]
        counter!(media_metrics::PLACEHOLDERS_TOTAL, labels::FOLDER => folder.to_string())
            .increment(1);

        info!(%public_id, url = %asset.secure_url, "generated placeholder");
        Ok(asset.secure_url)
    }

    async fn send_upload(&self, request: UploadRequest) -> Result<Asset> {
        let folder = request.folder.clone();

        #[cfg(feature = "metrics")]
        let start = std::time::Instant::now();
        #[cfg(feature = "metrics")]
        let size = request.source.len() as u64;

        let response = match self.host.upload(request).await {
            Ok(response) => response,
            Err(e) => {
                record_upload_error(&folder, "upload_failed");
                return Err(Error::upload_failed(folder, e));
            },
        };
        let asset = Asset::from_response(response, &folder).inspect_err(|e| {
            record_upload_error(&folder, e.kind());
        })?;

        #[cfg(feature = "metrics")]
        {
            counter!(media_metrics::UPLOADS_TOTAL, labels::FOLDER => folder.clone()).increment(1);
            counter!(media_metrics::UPLOAD_BYTES_TOTAL, labels::FOLDER => folder.clone())
                .increment(size);
            histogram!(media_metrics::UPLOAD_DURATION_SECONDS, labels::FOLDER => folder)
                .record(start.elapsed().as_secs_f64());
        }

        info!(public_id = %asset.public_id, url = %asset.secure_url, "uploaded image");
        Ok(asset)
    }
}

fn record_upload_error(folder: &str, kind: &'static str) {
    debug!(folder, kind, "upload failed");
    #[cfg(feature = "metrics")]
    counter!(
        media_metrics::UPLOAD_ERRORS_TOTAL,
        labels::FOLDER => folder.to_string(),
        labels::ERROR_TYPE => kind
    )
    .increment(1);
}

fn log_orphaned_asset(asset: &Asset, record_type: &str, record_id: &str, err: &Error) {
    warn!(
        public_id = %asset.public_id,
        url = %asset.secure_url,
        record_type,
        record_id,
        error = %err,
        "record update failed after upload; asset left on host"
    );
    #[cfg(feature = "metrics")]
    counter!(media_metrics::ORPHANED_ASSETS_TOTAL, labels::RECORD_TYPE => record_type.to_string())
        .increment(1);
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{UploadResponse, error::HostError},
        async_trait::async_trait,
        mediahost_records::{FieldKind, MemoryRecordStore, Record, RecordSchema, SchemaRegistry},
        serde_json::json,
        std::sync::Mutex,
    };

    /// In-process host that records requests and answers from a script.
    #[derive(Default)]
    struct FakeHost {
        uploads: Mutex<Vec<UploadRequest>>,
        destroyed: Mutex<Vec<String>>,
        fail_with: Option<u16>,
        omit_url: bool,
    }

    #[async_trait]
    impl MediaHost for FakeHost {
        fn id(&self) -> &'static str {
            "fake"
        }

        async fn upload(
            &self,
            request: UploadRequest,
        ) -> std::result::Result<UploadResponse, HostError> {
            if let Some(status) = self.fail_with {
                return Err(HostError::Status {
                    status,
                    message: "Invalid Signature".into(),
                });
            }
            let name = request
                .public_id
                .clone()
                .unwrap_or_else(|| format!("generated{}", self.uploads.lock().unwrap().len()));
            let public_id = format!("{}/{name}", request.folder);
            let secure_url = (!self.omit_url).then(|| {
                format!("https://res.example.com/demo/image/upload/v1/{public_id}.webp")
            });
            self.uploads.lock().unwrap().push(request);
            Ok(UploadResponse {
                public_id,
                secure_url,
                ..Default::default()
            })
        }

        async fn destroy(&self, public_id: &str) -> std::result::Result<DeletionResult, HostError> {
            self.destroyed.lock().unwrap().push(public_id.to_string());
            let result = if public_id.starts_with("blog-images/") {
                "ok"
            } else {
                "not found"
            };
            Ok(DeletionResult {
                result: result.into(),
                extra: Map::new(),
            })
        }
    }

    fn obj(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    async fn records() -> Arc<MemoryRecordStore> {
        let store = MemoryRecordStore::new(
            SchemaRegistry::new().with(
                RecordSchema::new("blog_posts")
                    .field("title", FieldKind::String)
                    .field("imageAlt", FieldKind::String),
            ),
        );
        store
            .insert(Record::new("blog_posts", "p1", obj(json!({"title": "Hello"}))))
            .await
            .unwrap();
        Arc::new(store)
    }

    async fn service(host: FakeHost) -> (MediaService, Arc<FakeHost>, Arc<MemoryRecordStore>) {
        let host = Arc::new(host);
        let records = records().await;
        let svc = MediaService::new(host.clone(), records.clone(), &MediaHostConfig::default());
        (svc, host, records)
    }

    fn png() -> Bytes {
        Bytes::from(image_ops::solid_png(4, 4, [1, 2, 3]).unwrap())
    }

    #[tokio::test]
    async fn empty_buffer_fails_before_any_request() {
        let (svc, host, _) = service(FakeHost::default()).await;
        let err = svc.upload(Bytes::new(), None).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));
        assert!(host.uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn upload_requests_bounded_webp() {
        let (svc, host, _) = service(FakeHost::default()).await;
        let asset = svc.upload(png(), None).await.unwrap();

        assert!(asset.secure_url.starts_with("https://"));
        assert_eq!(asset.folder, "blog-images");
        assert!(asset.public_id.starts_with("blog-images/"));

        let uploads = host.uploads.lock().unwrap();
        let request = &uploads[0];
        assert_eq!(request.folder, "blog-images");
        assert_eq!(
            request.transformation.as_deref(),
            Some("c_limit,h_630,w_1200/q_auto")
        );
        assert_eq!(request.format.as_deref(), Some("webp"));
        match &request.source {
            UploadSource::Bytes { media_type, .. } => assert_eq!(media_type, "image/png"),
            other => panic!("unexpected source {other:?}"),
        }
    }

    #[tokio::test]
    async fn upload_honours_explicit_folder() {
        let (svc, host, _) = service(FakeHost::default()).await;
        let asset = svc.upload(png(), Some("avatars")).await.unwrap();
        assert_eq!(asset.folder, "avatars");
        assert_eq!(host.uploads.lock().unwrap()[0].folder, "avatars");
    }

    #[tokio::test]
    async fn host_error_becomes_upload_failed() {
        let (svc, _, _) = service(FakeHost {
            fail_with: Some(401),
            ..Default::default()
        })
        .await;
        let err = svc.upload(png(), None).await.unwrap_err();
        match err {
            Error::UploadFailed { folder, source } => {
                assert_eq!(folder, "blog-images");
                assert_eq!(source.status(), Some(401));
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn from_config_rejects_bad_api_base() {
        let config = MediaHostConfig {
            api_base: "not a url".into(),
            ..Default::default()
        };
        let err = MediaService::from_config(&config, records().await).unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }), "unexpected error: {err}");
        assert!(err.to_string().contains("api base"));
    }

    #[tokio::test]
    async fn missing_url_is_reported() {
        let (svc, _, records) = service(FakeHost {
            omit_url: true,
            ..Default::default()
        })
        .await;
        let err = svc
            .upload_and_persist(png(), None, "blog_posts", "p1", Map::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingUrl { .. }));
        let record = records.get("blog_posts", "p1").await.unwrap().unwrap();
        assert!(record.media_url().is_none());
    }

    #[tokio::test]
    async fn upload_and_persist_updates_record() {
        let (svc, _, records) = service(FakeHost::default()).await;
        let out = svc
            .upload_and_persist(
                png(),
                None,
                "blog_posts",
                "p1",
                obj(json!({"imageAlt": "A cover", "mediaUrl": "https://ignored.example.com/x.png"})),
            )
            .await
            .unwrap();

        assert_eq!(out.url, out.asset.secure_url);
        assert_eq!(out.record.media_url(), Some(out.url.as_str()));
        assert_eq!(out.record.fields["imageAlt"], "A cover");
        assert_eq!(out.record.fields["title"], "Hello");

        let stored = records.get("blog_posts", "p1").await.unwrap().unwrap();
        assert_eq!(stored, out.record);
    }

    #[tokio::test]
    async fn upload_and_persist_unknown_record() {
        let (svc, host, _) = service(FakeHost::default()).await;
        let err = svc
            .upload_and_persist(png(), None, "blog_posts", "missing", Map::new())
            .await
            .unwrap_err();
        match err {
            Error::RecordNotFound { record_type, id } => {
                assert_eq!(record_type, "blog_posts");
                assert_eq!(id, "missing");
            },
            other => panic!("unexpected error: {other}"),
        }
        // the asset was created and is not rolled back
        assert_eq!(host.uploads.lock().unwrap().len(), 1);
        assert!(host.destroyed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn upload_and_persist_invalid_extra_fields() {
        let (svc, host, _) = service(FakeHost::default()).await;
        let err = svc
            .upload_and_persist(png(), None, "blog_posts", "p1", obj(json!({"author": "me"})))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Record {
                source: mediahost_records::Error::Validation { .. },
                ..
            }
        ));
        assert!(host.destroyed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn upload_failure_skips_record_update() {
        let (svc, _, records) = service(FakeHost {
            fail_with: Some(500),
            ..Default::default()
        })
        .await;
        let err = svc
            .upload_and_persist(png(), None, "blog_posts", "p1", Map::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UploadFailed { .. }));
        let record = records.get("blog_posts", "p1").await.unwrap().unwrap();
        assert!(record.media_url().is_none());
    }

    #[tokio::test]
    async fn delete_passes_host_result_through() {
        let (svc, host, _) = service(FakeHost::default()).await;
        assert!(svc.delete("blog-images/abc").await.unwrap().is_ok());
        assert!(svc.delete("nope/abc").await.unwrap().is_not_found());
        assert_eq!(host.destroyed.lock().unwrap().len(), 2);

        let err = svc.delete("  ").await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));
        assert_eq!(host.destroyed.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn placeholder_uses_derived_id_and_default_folder() {
        let (svc, host, _) = service(FakeHost::default()).await;
        let url = svc.generate_placeholder("My Campaign!", None).await.unwrap();
        assert_eq!(
            url,
            "https://res.example.com/demo/image/upload/v1/ad-defaults/default-ad-my-campaign-.webp"
        );

        let uploads = host.uploads.lock().unwrap();
        let request = &uploads[0];
        assert_eq!(request.folder, "ad-defaults");
        assert_eq!(request.public_id.as_deref(), Some("default-ad-my-campaign-"));
        assert!(
            request
                .transformation
                .as_deref()
                .unwrap()
                .contains("l_text:Arial_60_bold:My%20Campaign%21")
        );
        match &request.source {
            UploadSource::DataUri(uri) => assert!(uri.starts_with("data:image/png;base64,")),
            other => panic!("unexpected source {other:?}"),
        }
    }

    #[tokio::test]
    async fn placeholder_rejects_blank_title() {
        let (svc, host, _) = service(FakeHost::default()).await;
        let err = svc.generate_placeholder(" ", None).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));
        assert!(host.uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn placeholder_host_failure_is_upload_failed() {
        let (svc, _, _) = service(FakeHost {
            fail_with: Some(401),
            ..Default::default()
        })
        .await;
        let err = svc.generate_placeholder("Spring", Some("promo")).await.unwrap_err();
        assert!(matches!(err, Error::UploadFailed { ref folder, .. } if folder == "promo"));
    }
}
