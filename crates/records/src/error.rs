#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("no schema registered for record type `{record_type}`")]
    UnknownRecordType { record_type: String },
    #[error("{record_type}.{field}: {message}")]
    Validation {
        record_type: String,
        field: String,
        message: String,
    },
    #[error("{record_type} `{id}` already exists")]
    AlreadyExists { record_type: String, id: String },
    #[error("stored fields for {record_type} `{id}` are not a JSON object")]
    CorruptRecord { record_type: String, id: String },
}

impl Error {
    #[must_use]
    pub fn unknown_record_type(record_type: impl Into<String>) -> Self {
        Self::UnknownRecordType {
            record_type: record_type.into(),
        }
    }

    #[must_use]
    pub fn validation(
        record_type: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Validation {
            record_type: record_type.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn already_exists(record_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::AlreadyExists {
            record_type: record_type.into(),
            id: id.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
