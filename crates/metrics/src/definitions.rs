//! Metric name and label definitions.
//!
//! Centralizing these keeps names consistent between the media and records
//! crates and documents what is available to dashboards.

/// Media host metrics
pub mod media {
    /// Total number of successful uploads
    pub const UPLOADS_TOTAL: &str = "mediahost_uploads_total";
    /// Total number of failed uploads (local validation or host errors)
    pub const UPLOAD_ERRORS_TOTAL: &str = "mediahost_upload_errors_total";
    /// Upload round-trip duration in seconds
    pub const UPLOAD_DURATION_SECONDS: &str = "mediahost_upload_duration_seconds";
    /// Total bytes sent to the host
    pub const UPLOAD_BYTES_TOTAL: &str = "mediahost_upload_bytes_total";
    /// Total number of deletion requests
    pub const DELETIONS_TOTAL: &str = "mediahost_deletions_total";
    /// Total number of generated placeholders
    pub const PLACEHOLDERS_TOTAL: &str = "mediahost_placeholders_total";
    /// Uploads whose record update failed afterwards (asset left on the host)
    pub const ORPHANED_ASSETS_TOTAL: &str = "mediahost_orphaned_assets_total";
}

/// Record store metrics
pub mod records {
    /// Total number of record updates applied
    pub const UPDATES_TOTAL: &str = "mediahost_record_updates_total";
    /// Record updates that matched no record
    pub const NOT_FOUND_TOTAL: &str = "mediahost_record_not_found_total";
}

/// Common label keys
pub mod labels {
    pub const FOLDER: &str = "folder";
    pub const RECORD_TYPE: &str = "record_type";
    pub const RESULT: &str = "result";
    pub const ERROR_TYPE: &str = "error_type";
}
