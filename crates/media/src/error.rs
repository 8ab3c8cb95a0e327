/// Failure talking to the media host. Wrapped by [`Error::UploadFailed`] and
/// [`Error::DeletionFailed`] so callers see the host's own message.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("host returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("unexpected host response: {0}")]
    Decode(String),
    #[error("could not build request: {0}")]
    Request(String),
}

impl HostError {
    /// HTTP status reported by the host, if the request got that far.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Decode(_) | Self::Request(_) => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    #[error("upload to `{folder}` failed: {source}")]
    UploadFailed {
        folder: String,
        #[source]
        source: HostError,
    },

    #[error("deleting `{public_id}` failed: {source}")]
    DeletionFailed {
        public_id: String,
        #[source]
        source: HostError,
    },

    #[error("host returned no secure URL for `{public_id}`")]
    MissingUrl { public_id: String },

    #[error("no {record_type} record with id `{id}`")]
    RecordNotFound { record_type: String, id: String },

    #[error("updating {record_type} `{id}` failed: {source}")]
    Record {
        record_type: String,
        id: String,
        #[source]
        source: mediahost_records::Error,
    },
}

impl Error {
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn upload_failed(folder: impl Into<String>, source: HostError) -> Self {
        Self::UploadFailed {
            folder: folder.into(),
            source,
        }
    }

    #[must_use]
    pub fn deletion_failed(public_id: impl Into<String>, source: HostError) -> Self {
        Self::DeletionFailed {
            public_id: public_id.into(),
            source,
        }
    }

    #[must_use]
    pub fn record_not_found(record_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::RecordNotFound {
            record_type: record_type.into(),
            id: id.into(),
        }
    }

    /// Short stable name, used as a log field and metrics label.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "invalid_input",
            Self::UploadFailed { .. } => "upload_failed",
            Self::DeletionFailed { .. } => "deletion_failed",
            Self::MissingUrl { .. } => "missing_url",
            Self::RecordNotFound { .. } => "record_not_found",
            Self::Record { .. } => "record",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_failed_carries_host_message() {
        let err = Error::upload_failed(
            "blog-images",
            HostError::Status {
                status: 401,
                message: "Invalid Signature".into(),
            },
        );
        assert_eq!(
            err.to_string(),
            "upload to `blog-images` failed: host returned 401: Invalid Signature"
        );
        assert_eq!(err.kind(), "upload_failed");
    }

    #[test]
    fn record_not_found_names_type_and_id() {
        let err = Error::record_not_found("blog_posts", "42");
        assert_eq!(err.to_string(), "no blog_posts record with id `42`");
    }

    #[test]
    fn host_status_is_exposed() {
        let err = HostError::Status {
            status: 404,
            message: "nope".into(),
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(HostError::Decode("x".into()).status(), None);
    }
}
