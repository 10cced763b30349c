use crate::RecordType;
use serde::{Deserialize, Serialize};

/// One `[[static_records]]` table: every value is the rdata of a record
/// owned by `name` with type `record_type`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StaticRecordConfig {
    pub name: String,

    pub record_type: String,

    pub values: Vec<String>,
}

impl StaticRecordConfig {
    pub fn parsed_type(&self) -> Result<RecordType, String> {
        self.record_type.parse()
    }
}
