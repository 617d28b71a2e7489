//! Shared fixtures for the integration tests.

use serde_json::{json, Value};

use form_engine_core::schema::{FieldDefinition, SchemaDraft};
use form_engine_core::RecordData;

/// Parses flat field JSON the way stored schemas carry it.
pub fn fields(value: Value) -> Vec<FieldDefinition> {
    serde_json::from_value(value).expect("valid field list")
}

pub fn payload(value: Value) -> RecordData {
    value.as_object().cloned().expect("payload must be an object")
}

/// A survey with one field of every type class.
pub fn survey_draft() -> SchemaDraft {
    SchemaDraft {
        name: "Customer survey".to_string(),
        description: "Quarterly satisfaction survey".to_string(),
        fields: fields(json!([
            {"id": "ref", "name": "ref", "label": "Reference", "type": "id", "id_type": "uuid"},
            {"id": "name", "label": "Name", "type": "string", "required": true,
             "min_length": 2, "max_length": 40, "placeholder": "Your name"},
            {"id": "score", "label": "Score", "type": "number",
             "min_value": 0, "max_value": 100, "precision": 1},
            {"id": "visited", "label": "Visited on", "type": "time", "time_format": "date"},
            {"id": "channel", "label": "Channel", "type": "enum", "required": true,
             "enum_options": [{"label": "Email", "value": "email"},
                              {"label": "Phone", "value": "phone"}]}
        ])),
    }
}

pub fn valid_survey_payload() -> RecordData {
    payload(json!({
        "ref": "67e55044-10b1-426f-9247-bb680e5fe0c8",
        "name": "Ada",
        "score": 99.5,
        "visited": "2024-03-01",
        "channel": "email",
        "comment": "not part of the schema"
    }))
}
