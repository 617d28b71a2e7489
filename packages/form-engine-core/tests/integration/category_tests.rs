//! Category tree maintenance through transactions.

use ntest::timeout;

use form_engine_core::category::{
    would_create_cycle, CategoryService, CategoryUpdate, NewCategory,
};
use form_engine_core::ids::{CategoryId, FileId};
use form_engine_core::store::{CategoryStore, Database, FileIndex, FileRef};
use form_engine_core::FormError;

fn create(db: &Database, svc: &CategoryService, input: NewCategory) -> CategoryId {
    db.transaction(|tx| svc.create_category(tx, input))
        .unwrap()
        .id
}

#[timeout(1000)]
#[test]
fn test_cycle_checks_on_chain() {
    let db = Database::new();
    let svc = CategoryService::default();
    let a = create(&db, &svc, NewCategory::new("A"));
    let b = create(&db, &svc, NewCategory::new("B").under(a));
    let c = create(&db, &svc, NewCategory::new("C").under(b));
    let d = create(&db, &svc, NewCategory::new("D"));

    db.read(|t| {
        assert!(would_create_cycle(t, a, c, 1024)?);
        assert!(!would_create_cycle(t, a, d, 1024)?);
        assert!(would_create_cycle(t, a, a, 1024)?);
        Ok::<_, FormError>(())
    })
    .unwrap();
}

#[timeout(1000)]
#[test]
fn test_rejected_reparent_leaves_tree_unchanged() {
    let db = Database::new();
    let svc = CategoryService::default();
    let a = create(&db, &svc, NewCategory::new("A"));
    let b = create(&db, &svc, NewCategory::new("B").under(a));
    let c = create(&db, &svc, NewCategory::new("C").under(b));

    let update = CategoryUpdate {
        description: Some("should not stick".to_string()),
        ..CategoryUpdate::reparent(Some(c))
    };
    let err = db
        .transaction(|tx| svc.update_category(tx, a, update))
        .unwrap_err();
    assert_eq!(
        err,
        FormError::CycleRejected {
            node: a.get(),
            parent: c.get()
        }
    );

    let root = db.read(|t| t.get_category(a)).unwrap().unwrap();
    assert_eq!(root.parent_id, None);
    assert!(root.description.is_empty());
}

#[timeout(1000)]
#[test]
fn test_move_subtree_under_sibling() {
    let db = Database::new();
    let svc = CategoryService::default();
    let docs = create(&db, &svc, NewCategory::new("Docs"));
    let media = create(&db, &svc, NewCategory::new("Media"));
    let images = create(&db, &svc, NewCategory::new("Images").under(media));

    db.transaction(|tx| svc.update_category(tx, media, CategoryUpdate::reparent(Some(docs))))
        .unwrap();

    let tree = db.read(|t| svc.category_tree(t)).unwrap();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].category.id, docs);
    assert_eq!(tree[0].children[0].category.id, media);
    assert_eq!(tree[0].children[0].children[0].category.id, images);

    // Moving back to the root
    db.transaction(|tx| svc.update_category(tx, media, CategoryUpdate::reparent(None)))
        .unwrap();
    assert_eq!(db.read(|t| t.children(None)).unwrap().len(), 2);
}

#[timeout(1000)]
#[test]
fn test_delete_rules_with_files() {
    let db = Database::new();
    let svc = CategoryService::default();
    let reports = create(&db, &svc, NewCategory::new("Reports"));

    let file = db
        .transaction(|tx| {
            tx.create_file(FileRef {
                id: FileId(0),
                name: "q1.pdf".to_string(),
                category_id: Some(reports),
                is_deleted: false,
            })
        })
        .unwrap();

    let err = db
        .transaction(|tx| svc.delete_category(tx, reports))
        .unwrap_err();
    assert!(matches!(
        err,
        FormError::ReferentialConflict {
            dependents: 1,
            kind: "files",
            ..
        }
    ));

    db.transaction(|tx| {
        let mut trashed = tx.get_file(file)?.expect("file exists");
        trashed.is_deleted = true;
        tx.replace_file(trashed)
    })
    .unwrap();
    db.transaction(|tx| svc.delete_category(tx, reports))
        .unwrap();

    assert!(matches!(
        db.transaction(|tx| svc.delete_category(tx, reports)),
        Err(FormError::NotFound { .. })
    ));
}
