// Copyright (c) 2025 Pennyflow.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::errors::Result;
use crate::models::RecordKind;

pub mod memory;

pub use memory::MemoryStore;

/// Field map of one document.
pub type Fields = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub fields: Fields,
}

impl Document {
    pub fn new(fields: Fields) -> Self {
        Document { fields }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// Slash-separated document path, e.g. `users/u1/purchases/Coffee`.
/// Alternating collection/document segments, the way the backing stores
/// shape their keys; the final segment is the document id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocPath(Vec<String>);

impl DocPath {
    pub fn new(segments: Vec<String>) -> Self {
        DocPath(segments)
    }

    /// Profile document for a user.
    pub fn user(user_id: &str) -> Self {
        DocPath(vec!["users".into(), user_id.into()])
    }

    /// Record collection of one kind for a user.
    pub fn records(user_id: &str, kind: RecordKind) -> Self {
        let mut path = Self::user(user_id);
        path.0.push(kind.collection().into());
        path
    }

    /// A single record document, keyed by its name.
    pub fn record(user_id: &str, kind: RecordKind, name: &str) -> Self {
        let mut path = Self::records(user_id, kind);
        path.0.push(name.into());
        path
    }

    /// Path with the last segment removed; `None` at the root.
    pub fn parent(&self) -> Option<DocPath> {
        if self.0.len() <= 1 {
            return None;
        }
        Some(DocPath(self.0[..self.0.len() - 1].to_vec()))
    }

    /// Last segment: the document id (or collection name).
    pub fn id(&self) -> &str {
        self.0.last().map(String::as_str).unwrap_or("")
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

pub type DocumentCallback = Arc<dyn Fn(Option<&Document>) + Send + Sync>;
pub type CollectionCallback = Arc<dyn Fn(&[(String, Document)]) + Send + Sync>;

/// Unsubscribe handle. Dropping it releases the underlying watcher, so a
/// consuming scope cannot leak its subscription.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Subscription {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

/// The document-store collaborator. The real backend lives behind this
/// trait; everything network-, auth-, and transport-shaped is its problem.
pub trait DocumentStore: Send + Sync {
    /// Point read. Absence is `None`, not an error.
    fn get(&self, path: &DocPath) -> Result<Option<Document>>;

    /// Full overwrite; creates the document when absent.
    fn set(&self, path: &DocPath, fields: Fields) -> Result<()>;

    /// Merge-patch; creates the document when absent.
    fn update(&self, path: &DocPath, partial: Fields) -> Result<()>;

    /// Idempotent delete; removing an absent document succeeds.
    fn delete(&self, path: &DocPath) -> Result<()>;

    /// All documents directly under a collection path, as (id, document).
    fn list(&self, path: &DocPath) -> Result<Vec<(String, Document)>>;

    /// Read-modify-write of one document. The default is get-then-set;
    /// implementations that can make this atomic must override it, since
    /// the balance ledger relies on it to avoid lost updates.
    fn transform(
        &self,
        path: &DocPath,
        apply: &mut dyn FnMut(Option<&Document>) -> Fields,
    ) -> Result<()> {
        let current = self.get(path)?;
        let next = apply(current.as_ref());
        self.set(path, next)
    }

    /// Push notification on every change to one document.
    fn subscribe_document(&self, path: &DocPath, on_change: DocumentCallback)
        -> Result<Subscription>;

    /// Push notification with the full listing on every change under a
    /// collection.
    fn subscribe_collection(
        &self,
        path: &DocPath,
        on_change: CollectionCallback,
    ) -> Result<Subscription>;
}
