// Copyright (c) 2025 Pennyflow.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use pennyflow::errors::CoreError;
use pennyflow::models::RecordKind;
use pennyflow::store::{DocPath, Document, DocumentStore, Fields, MemoryStore};
use serde_json::json;

fn fields(value: serde_json::Value) -> Fields {
    value.as_object().cloned().unwrap()
}

#[test]
fn set_then_get_round_trips() {
    let store = MemoryStore::new();
    let path = DocPath::user("u1");
    store
        .set(&path, fields(json!({"name": "Test", "balance": "10"})))
        .unwrap();
    let doc = store.get(&path).unwrap().unwrap();
    assert_eq!(doc.field("name"), Some(&json!("Test")));
    assert!(store.get(&DocPath::user("u2")).unwrap().is_none());
}

#[test]
fn update_merges_and_creates_when_absent() {
    let store = MemoryStore::new();
    let path = DocPath::user("u1");
    store
        .set(&path, fields(json!({"name": "Test", "balance": "10"})))
        .unwrap();
    store
        .update(&path, fields(json!({"balance": "25"})))
        .unwrap();
    let doc = store.get(&path).unwrap().unwrap();
    assert_eq!(doc.field("name"), Some(&json!("Test")));
    assert_eq!(doc.field("balance"), Some(&json!("25")));

    let other = DocPath::user("u2");
    store.update(&other, fields(json!({"balance": "5"}))).unwrap();
    assert!(store.get(&other).unwrap().is_some());
}

#[test]
fn delete_is_idempotent() {
    let store = MemoryStore::new();
    let path = DocPath::record("u1", RecordKind::Purchase, "Coffee");
    store.set(&path, fields(json!({"name": "Coffee"}))).unwrap();
    store.delete(&path).unwrap();
    assert!(store.get(&path).unwrap().is_none());
    store.delete(&path).unwrap();
}

#[test]
fn list_returns_only_direct_children() {
    let store = MemoryStore::new();
    store
        .set(&DocPath::user("u1"), fields(json!({"name": "Test"})))
        .unwrap();
    store
        .set(
            &DocPath::record("u1", RecordKind::Purchase, "Coffee"),
            fields(json!({"name": "Coffee"})),
        )
        .unwrap();
    store
        .set(
            &DocPath::record("u1", RecordKind::Purchase, "Bagel"),
            fields(json!({"name": "Bagel"})),
        )
        .unwrap();
    store
        .set(
            &DocPath::record("u1", RecordKind::Subscription, "Netflix"),
            fields(json!({"name": "Netflix"})),
        )
        .unwrap();

    let listing = store
        .list(&DocPath::records("u1", RecordKind::Purchase))
        .unwrap();
    let ids: Vec<&str> = listing.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids, vec!["Bagel", "Coffee"]);
}

#[test]
fn document_subscription_fires_until_dropped() {
    let store = MemoryStore::new();
    let path = DocPath::user("u1");
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let sub = store
        .subscribe_document(
            &path,
            Arc::new(move |doc: Option<&Document>| {
                sink.lock().unwrap().push(doc.cloned());
            }),
        )
        .unwrap();

    store.set(&path, fields(json!({"balance": "1"}))).unwrap();
    store.delete(&path).unwrap();
    assert_eq!(seen.lock().unwrap().len(), 2);
    assert!(seen.lock().unwrap()[1].is_none());

    drop(sub);
    store.set(&path, fields(json!({"balance": "2"}))).unwrap();
    assert_eq!(seen.lock().unwrap().len(), 2);
}

#[test]
fn collection_subscription_delivers_full_listing() {
    let store = MemoryStore::new();
    let collection = DocPath::records("u1", RecordKind::Purchase);
    let sizes = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&sizes);
    let _sub = store
        .subscribe_collection(
            &collection,
            Arc::new(move |docs: &[(String, Document)]| {
                sink.lock().unwrap().push(docs.len());
            }),
        )
        .unwrap();

    store
        .set(
            &DocPath::record("u1", RecordKind::Purchase, "Coffee"),
            fields(json!({"name": "Coffee"})),
        )
        .unwrap();
    store
        .set(
            &DocPath::record("u1", RecordKind::Purchase, "Bagel"),
            fields(json!({"name": "Bagel"})),
        )
        .unwrap();
    store
        .delete(&DocPath::record("u1", RecordKind::Purchase, "Coffee"))
        .unwrap();

    assert_eq!(*sizes.lock().unwrap(), vec![1, 2, 1]);
}

#[test]
fn transform_serializes_concurrent_writers() {
    let store = MemoryStore::new();
    let path = DocPath::user("u1");
    let mut handles = Vec::new();
    for _ in 0..4 {
        let store = store.clone();
        let path = path.clone();
        handles.push(std::thread::spawn(move || {
            for _ in 0..50 {
                store
                    .transform(&path, &mut |current| {
                        let mut f = current.map(|d| d.fields.clone()).unwrap_or_default();
                        let n = f.get("n").and_then(|v| v.as_i64()).unwrap_or(0);
                        f.insert("n".into(), json!(n + 1));
                        f
                    })
                    .unwrap();
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
    let doc = store.get(&path).unwrap().unwrap();
    assert_eq!(doc.field("n"), Some(&json!(200)));
}

#[test]
fn injected_failure_is_one_shot() {
    let store = MemoryStore::new();
    let path = DocPath::user("u1");
    store.fail_after_writes(0, "quota exceeded");
    let err = store
        .set(&path, fields(json!({"balance": "1"})))
        .unwrap_err();
    assert!(matches!(err, CoreError::Unavailable(_)));
    assert!(store.get(&path).unwrap().is_none());

    store.set(&path, fields(json!({"balance": "1"}))).unwrap();
    assert!(store.get(&path).unwrap().is_some());
}

#[test]
fn callbacks_may_reenter_the_store() {
    let store = MemoryStore::new();
    let path = DocPath::user("u1");
    let reads = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&reads);
    let inner = store.clone();
    let probe = DocPath::user("u1");
    let _sub = store
        .subscribe_document(
            &path,
            Arc::new(move |_doc: Option<&Document>| {
                if inner.get(&probe).unwrap().is_some() {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            }),
        )
        .unwrap();
    store.set(&path, fields(json!({"balance": "1"}))).unwrap();
    assert_eq!(reads.load(Ordering::SeqCst), 1);
}
