//! Engine operations run through `Database::transaction`.

use ntest::timeout;
use serde_json::json;

use form_engine_core::schema::SchemaDraft;
use form_engine_core::store::{Database, RecordStore, SchemaStore};
use form_engine_core::{Actor, FormEngine, FormError, FormRecord, FormSchema};

use super::helpers::{fields, payload, survey_draft, valid_survey_payload};

fn define(db: &Database, actor: &Actor, draft: SchemaDraft) -> FormSchema {
    db.transaction(|tx| FormEngine::new().define_schema(tx, actor, draft))
        .unwrap()
}

#[timeout(1000)]
#[test]
fn test_submit_then_fetch_returns_payload() {
    let db = Database::new();
    let engine = FormEngine::new();
    let owner = Actor::user(1);
    let schema = define(&db, &owner, survey_draft());

    let record: FormRecord = db
        .transaction(|tx| engine.submit_record(tx, &owner, schema.id, valid_survey_payload()))
        .unwrap();
    let fetched = db
        .read(|t| engine.get_record(t, &owner, record.id))
        .unwrap();

    assert_eq!(fetched.data, valid_survey_payload());
    assert_eq!(fetched.owner, owner.user_id);
}

#[timeout(1000)]
#[test]
fn test_first_failure_in_field_order_is_reported() {
    let db = Database::new();
    let engine = FormEngine::new();
    let owner = Actor::user(1);
    let schema = define(&db, &owner, survey_draft());

    let cases = [
        (json!({"channel": "email"}), "name", "missing required field `Name`"),
        (json!({"name": "A", "channel": "fax"}), "name", "length 1 is below min_length 2"),
        (json!({"name": "Ada", "score": 100.5, "channel": "fax"}), "score", "value 100.5 exceeds max_value 100"),
        (json!({"name": "Ada", "score": 9.25, "channel": "email"}), "score", "value has 2 decimal digits, precision is 1"),
        (json!({"name": "Ada", "visited": "03/01/2024", "channel": "email"}), "visited", "expected a date in YYYY-MM-DD format"),
        (json!({"name": "Ada", "channel": "fax"}), "channel", "value \"fax\" is not one of the allowed options"),
        (json!({"ref": 12, "name": "Ada", "channel": "email"}), "ref", "expected a UUID identifier"),
    ];

    for (data, field, reason) in cases {
        let err = db
            .transaction(|tx| engine.submit_record(tx, &owner, schema.id, payload(data.clone())))
            .unwrap_err();
        match err {
            FormError::ValidationFailed(v) => {
                assert_eq!(v.field, field, "payload {}", data);
                assert_eq!(v.reason, reason, "payload {}", data);
            }
            other => panic!("Expected validation failure, got {:?}", other),
        }
    }

    let stored = db.read(|t| t.list_records(schema.id)).unwrap();
    assert!(stored.is_empty());
}

#[timeout(1000)]
#[test]
fn test_retire_blocked_until_records_are_gone() {
    let db = Database::new();
    let engine = FormEngine::new();
    let owner = Actor::user(1);
    let schema = define(&db, &owner, survey_draft());
    let record = db
        .transaction(|tx| engine.submit_record(tx, &owner, schema.id, valid_survey_payload()))
        .unwrap();

    let err = db
        .transaction(|tx| engine.retire_schema(tx, &owner, schema.id))
        .unwrap_err();
    assert_eq!(
        err,
        FormError::ReferentialConflict {
            entity: "form schema",
            id: schema.id.get(),
            dependents: 1,
            kind: "records",
        }
    );

    db.transaction(|tx| engine.delete_record(tx, &owner, record.id))
        .unwrap();
    db.transaction(|tx| engine.retire_schema(tx, &owner, schema.id))
        .unwrap();
    assert!(db.read(|t| t.get_schema(schema.id)).unwrap().is_none());
}

#[timeout(1000)]
#[test]
fn test_revision_keeps_existing_records_untouched() {
    let db = Database::new();
    let engine = FormEngine::new();
    let owner = Actor::user(1);
    let schema = define(&db, &owner, survey_draft());
    let record = db
        .transaction(|tx| engine.submit_record(tx, &owner, schema.id, valid_survey_payload()))
        .unwrap();

    let stricter = SchemaDraft {
        name: "Customer survey v2".to_string(),
        description: String::new(),
        fields: fields(json!([
            {"id": "email", "label": "Email", "type": "email", "required": true}
        ])),
    };
    let revised = db
        .transaction(|tx| engine.revise_schema(tx, &owner, schema.id, stricter))
        .unwrap();
    assert_eq!(revised.fields.len(), 1);
    assert_eq!(revised.created_at, schema.created_at);

    // Old record still readable with its original payload
    let kept = db.read(|t| engine.get_record(t, &owner, record.id)).unwrap();
    assert_eq!(kept.data, valid_survey_payload());

    // Revising it now has to satisfy the new shape
    let err = db
        .transaction(|tx| engine.revise_record(tx, &owner, record.id, valid_survey_payload()))
        .unwrap_err();
    assert!(matches!(err, FormError::ValidationFailed(ref v) if v.field == "email"));
}

#[timeout(1000)]
#[test]
fn test_visibility_between_users() {
    let db = Database::new();
    let engine = FormEngine::new();
    let alice = Actor::user(1);
    let bob = Actor::user(2);
    let admin = Actor::admin(3);
    let schema = define(&db, &alice, survey_draft());

    assert!(matches!(
        db.read(|t| engine.list_records(t, &bob, schema.id)),
        Err(FormError::NotFound { .. })
    ));
    assert!(matches!(
        db.transaction(|tx| engine.retire_schema(tx, &bob, schema.id)),
        Err(FormError::NotFound { .. })
    ));

    let record = db
        .transaction(|tx| engine.submit_record(tx, &admin, schema.id, valid_survey_payload()))
        .unwrap();
    let listed = db.read(|t| engine.list_records(t, &alice, schema.id)).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(
        db.transaction(|tx| engine.delete_record(tx, &alice, record.id)),
        Err(FormError::Forbidden {
            entity: "form record",
            id: record.id.get()
        })
    );
    db.transaction(|tx| engine.delete_record(tx, &admin, record.id))
        .unwrap();
    assert_eq!(db.read(|t| t.count_records(schema.id)).unwrap(), 0);
}

#[timeout(1000)]
#[test]
fn test_unknown_field_type_is_tolerated_until_filled() {
    let db = Database::new();
    let engine = FormEngine::new();
    let owner = Actor::user(1);
    let draft = SchemaDraft {
        name: "Map pins".to_string(),
        description: String::new(),
        fields: fields(json!([
            {"id": "pin", "label": "Pin", "type": "geo_point", "zoom": 4}
        ])),
    };
    let schema = define(&db, &owner, draft);
    assert_eq!(schema.fields[0].type_tag, "geo_point");

    db.transaction(|tx| engine.submit_record(tx, &owner, schema.id, payload(json!({}))))
        .unwrap();
    let err = db
        .transaction(|tx| {
            engine.submit_record(tx, &owner, schema.id, payload(json!({"pin": "52.1,4.3"})))
        })
        .unwrap_err();
    assert!(matches!(err, FormError::ValidationFailed(ref v) if v.reason.contains("geo_point")));
}
