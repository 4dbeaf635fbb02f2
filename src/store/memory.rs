// Copyright (c) 2025 Pennyflow.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use crate::errors::{CoreError, Result};

use super::{
    CollectionCallback, DocPath, Document, DocumentCallback, DocumentStore, Fields, Subscription,
};

#[derive(Default)]
struct Watchers {
    next_id: u64,
    documents: HashMap<DocPath, Vec<(u64, DocumentCallback)>>,
    collections: HashMap<DocPath, Vec<(u64, CollectionCallback)>>,
}

#[derive(Default)]
struct Shared {
    docs: Mutex<BTreeMap<DocPath, Fields>>,
    watchers: Mutex<Watchers>,
    // (writes to let through, error message)
    failure: Mutex<Option<(u64, String)>>,
}

/// In-memory document store: the reference implementation of the
/// collaborator contract, and what the tests run against. Clones share
/// state. Notifications are delivered synchronously on the writing thread,
/// and `transform` holds the data lock across the read-modify-write.
#[derive(Clone, Default)]
pub struct MemoryStore {
    shared: Arc<Shared>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Let `after` more writes succeed, then fail the next one with
    /// `Unavailable`. One-shot; used to exercise partial-failure paths.
    pub fn fail_after_writes(&self, after: u64, message: &str) {
        let mut slot = self.shared.failure.lock().expect("failure lock");
        *slot = Some((after, message.to_string()));
    }

    fn check_failure(&self) -> Result<()> {
        let mut slot = self.shared.failure.lock().expect("failure lock");
        let fire = match slot.as_mut() {
            Some((0, _)) => true,
            Some((remaining, _)) => {
                *remaining -= 1;
                false
            }
            None => false,
        };
        if fire {
            let (_, message) = slot.take().expect("failure armed");
            return Err(CoreError::Unavailable(message));
        }
        Ok(())
    }

    fn collection_snapshot(
        docs: &BTreeMap<DocPath, Fields>,
        collection: &DocPath,
    ) -> Vec<(String, Document)> {
        docs.iter()
            .filter(|(path, _)| path.parent().as_ref() == Some(collection))
            .map(|(path, fields)| (path.id().to_string(), Document::new(fields.clone())))
            .collect()
    }

    // Callbacks are cloned out under the watcher lock and invoked with no
    // locks held, so a callback may re-enter the store.
    fn notify(
        &self,
        path: &DocPath,
        doc: Option<Document>,
        siblings: Option<Vec<(String, Document)>>,
    ) {
        let (doc_callbacks, collection_callbacks) = {
            let watchers = self.shared.watchers.lock().expect("watchers lock");
            let doc_callbacks: Vec<DocumentCallback> = watchers
                .documents
                .get(path)
                .map(|subs| subs.iter().map(|(_, cb)| Arc::clone(cb)).collect())
                .unwrap_or_default();
            let collection_callbacks: Vec<CollectionCallback> = path
                .parent()
                .and_then(|collection| watchers.collections.get(&collection))
                .map(|subs| subs.iter().map(|(_, cb)| Arc::clone(cb)).collect())
                .unwrap_or_default();
            (doc_callbacks, collection_callbacks)
        };
        for callback in doc_callbacks {
            callback(doc.as_ref());
        }
        if let Some(listing) = siblings {
            for callback in collection_callbacks {
                callback(&listing);
            }
        }
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, path: &DocPath) -> Result<Option<Document>> {
        let docs = self.shared.docs.lock().expect("docs lock");
        Ok(docs.get(path).map(|fields| Document::new(fields.clone())))
    }

    fn set(&self, path: &DocPath, fields: Fields) -> Result<()> {
        self.check_failure()?;
        let (doc, siblings) = {
            let mut docs = self.shared.docs.lock().expect("docs lock");
            docs.insert(path.clone(), fields.clone());
            let siblings = path
                .parent()
                .map(|collection| Self::collection_snapshot(&docs, &collection));
            (Some(Document::new(fields)), siblings)
        };
        self.notify(path, doc, siblings);
        Ok(())
    }

    fn update(&self, path: &DocPath, partial: Fields) -> Result<()> {
        self.check_failure()?;
        let (doc, siblings) = {
            let mut docs = self.shared.docs.lock().expect("docs lock");
            let entry = docs.entry(path.clone()).or_default();
            for (key, value) in partial {
                entry.insert(key, value);
            }
            let doc = Document::new(entry.clone());
            let siblings = path
                .parent()
                .map(|collection| Self::collection_snapshot(&docs, &collection));
            (Some(doc), siblings)
        };
        self.notify(path, doc, siblings);
        Ok(())
    }

    fn delete(&self, path: &DocPath) -> Result<()> {
        self.check_failure()?;
        let (existed, siblings) = {
            let mut docs = self.shared.docs.lock().expect("docs lock");
            let existed = docs.remove(path).is_some();
            let siblings = path
                .parent()
                .map(|collection| Self::collection_snapshot(&docs, &collection));
            (existed, siblings)
        };
        if existed {
            self.notify(path, None, siblings);
        }
        Ok(())
    }

    fn list(&self, path: &DocPath) -> Result<Vec<(String, Document)>> {
        let docs = self.shared.docs.lock().expect("docs lock");
        Ok(Self::collection_snapshot(&docs, path))
    }

    fn transform(
        &self,
        path: &DocPath,
        apply: &mut dyn FnMut(Option<&Document>) -> Fields,
    ) -> Result<()> {
        self.check_failure()?;
        let (doc, siblings) = {
            // Lock held across read-modify-write: concurrent transforms of
            // the same document serialize instead of losing updates.
            let mut docs = self.shared.docs.lock().expect("docs lock");
            let current = docs.get(path).map(|fields| Document::new(fields.clone()));
            let next = apply(current.as_ref());
            docs.insert(path.clone(), next.clone());
            let siblings = path
                .parent()
                .map(|collection| Self::collection_snapshot(&docs, &collection));
            (Some(Document::new(next)), siblings)
        };
        self.notify(path, doc, siblings);
        Ok(())
    }

    fn subscribe_document(
        &self,
        path: &DocPath,
        on_change: DocumentCallback,
    ) -> Result<Subscription> {
        let id = {
            let mut watchers = self.shared.watchers.lock().expect("watchers lock");
            watchers.next_id += 1;
            let id = watchers.next_id;
            watchers
                .documents
                .entry(path.clone())
                .or_default()
                .push((id, on_change));
            id
        };
        let shared = Arc::downgrade(&self.shared);
        let path = path.clone();
        Ok(Subscription::new(move || {
            if let Some(shared) = shared.upgrade() {
                let mut watchers = shared.watchers.lock().expect("watchers lock");
                if let Some(subs) = watchers.documents.get_mut(&path) {
                    subs.retain(|(sub_id, _)| *sub_id != id);
                }
            }
        }))
    }

    fn subscribe_collection(
        &self,
        path: &DocPath,
        on_change: CollectionCallback,
    ) -> Result<Subscription> {
        let id = {
            let mut watchers = self.shared.watchers.lock().expect("watchers lock");
            watchers.next_id += 1;
            let id = watchers.next_id;
            watchers
                .collections
                .entry(path.clone())
                .or_default()
                .push((id, on_change));
            id
        };
        let shared = Arc::downgrade(&self.shared);
        let path = path.clone();
        Ok(Subscription::new(move || {
            if let Some(shared) = shared.upgrade() {
                let mut watchers = shared.watchers.lock().expect("watchers lock");
                if let Some(subs) = watchers.collections.get_mut(&path) {
                    subs.retain(|(sub_id, _)| *sub_id != id);
                }
            }
        }))
    }
}
