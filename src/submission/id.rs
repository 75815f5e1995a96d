use chrono::{DateTime, Utc};
use serde::Serialize;

use super::record::RecordKind;

/// Time-based submission identifier, `<prefix>_<epoch-millis>`.
///
/// Two submissions of the same kind minted within one millisecond share an id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn mint(kind: RecordKind, at: DateTime<Utc>) -> Self {
        RecordId(format!("{}_{}", kind.id_prefix(), at.timestamp_millis()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
