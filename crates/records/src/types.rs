use {
    serde::{Deserialize, Serialize},
    serde_json::{Map, Value},
};

/// Field that receives the secure URL of an uploaded asset.
pub const MEDIA_URL_FIELD: &str = "mediaUrl";

/// An application document that can point at hosted media.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub record_type: String,
    pub id: String,
    pub fields: Map<String, Value>,
    /// Milliseconds since epoch.
    pub created_at: u64,
    /// Milliseconds since epoch, bumped on every update.
    pub updated_at: u64,
}

impl Record {
    /// Create a record stamped with the current time.
    pub fn new(
        record_type: impl Into<String>,
        id: impl Into<String>,
        fields: Map<String, Value>,
    ) -> Self {
        let now = mediahost_common::time::now_ms();
        Self {
            record_type: record_type.into(),
            id: id.into(),
            fields,
            created_at: now,
            updated_at: now,
        }
    }

    /// URL of the asset currently attached, if any.
    #[must_use]
    pub fn media_url(&self) -> Option<&str> {
        self.fields.get(MEDIA_URL_FIELD).and_then(Value::as_str)
    }

    /// Shallow-merge `patch` into the record's fields and bump `updated_at`.
    pub(crate) fn apply(&mut self, patch: Map<String, Value>) {
        self.fields.extend(patch);
        self.updated_at = mediahost_common::time::now_ms().max(self.updated_at);
    }
}
