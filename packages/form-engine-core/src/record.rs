//! Form records: payloads submitted against a schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ids::{RecordId, SchemaId, UserId};

/// Dynamic record payload: field id to arbitrary JSON value.
pub type RecordData = Map<String, Value>;

/// A stored form record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormRecord {
    pub id: RecordId,
    /// Schema the payload was validated against; never re-pointed
    pub schema_id: SchemaId,
    /// Author of the record
    pub owner: UserId,
    pub data: RecordData,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
