// Copyright (c) 2025 Pennyflow.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::errors::{CoreError, Result};
use crate::ledger::{self, Effect};
use crate::models::{Record, RecordKind};
use crate::store::{DocPath, DocumentStore};

/// Create a record for the user, then post its effect to the balance
/// ledger. The duplicate check is a point lookup on the name-keyed path,
/// not a scan. A one-time purchase with no date is stamped with the
/// current time.
///
/// If the ledger write fails after the record landed, the record is
/// removed again so the store and the cached balance stay consistent, and
/// the ledger error is returned.
pub fn create_record(
    store: &dyn DocumentStore,
    user_id: &str,
    kind: RecordKind,
    mut record: Record,
) -> Result<()> {
    validate(kind, &record)?;
    if kind == RecordKind::Purchase && record.date.is_none() {
        record.date = Some(Utc::now());
    }

    let path = DocPath::record(user_id, kind, &record.name);
    if store.get(&path)?.is_some() {
        return Err(CoreError::DuplicateName {
            kind,
            name: record.name,
        });
    }
    store.set(&path, record.to_fields()?)?;

    if let Err(err) = ledger::apply_record_effect(
        store,
        user_id,
        record.price,
        record.withdrawing,
        Effect::Apply,
    ) {
        if let Err(comp) = store.delete(&path) {
            warn!(%path, error = %comp, "could not roll back record after ledger failure");
        }
        return Err(err);
    }
    debug!(%path, price = %record.price, withdrawing = record.withdrawing, "record created");
    Ok(())
}

/// Delete a record and reverse its effect on the balance. The stored
/// document is read first to recover price and direction; a missing record
/// is `NotFound`. The ledger is reversed before the delete; if the delete
/// then fails, the reversal is posted back so the balance still matches
/// the stored records.
pub fn delete_record(
    store: &dyn DocumentStore,
    user_id: &str,
    kind: RecordKind,
    name: &str,
) -> Result<()> {
    let path = DocPath::record(user_id, kind, name);
    let doc = store.get(&path)?.ok_or_else(|| CoreError::NotFound {
        kind,
        name: name.to_string(),
    })?;
    let record = Record::from_document(doc.fields)?;

    ledger::apply_record_effect(
        store,
        user_id,
        record.price,
        record.withdrawing,
        Effect::Reverse,
    )?;
    if let Err(err) = store.delete(&path) {
        if let Err(comp) = ledger::apply_record_effect(
            store,
            user_id,
            record.price,
            record.withdrawing,
            Effect::Apply,
        ) {
            warn!(%path, error = %comp, "could not restore balance after delete failure");
        }
        return Err(err);
    }
    debug!(%path, "record deleted");
    Ok(())
}

/// All records of one kind for the user, unordered as stored. Documents
/// that no longer decode are skipped with a warning rather than failing
/// the whole listing.
pub fn list_records(
    store: &dyn DocumentStore,
    user_id: &str,
    kind: RecordKind,
) -> Result<Vec<Record>> {
    let docs = store.list(&DocPath::records(user_id, kind))?;
    let mut records = Vec::with_capacity(docs.len());
    for (id, doc) in docs {
        match Record::from_document(doc.fields) {
            Ok(record) => records.push(record),
            Err(err) => warn!(record = %id, error = %err, "skipping undecodable record"),
        }
    }
    Ok(records)
}

pub fn get_record(
    store: &dyn DocumentStore,
    user_id: &str,
    kind: RecordKind,
    name: &str,
) -> Result<Option<Record>> {
    match store.get(&DocPath::record(user_id, kind, name))? {
        Some(doc) => Record::from_document(doc.fields).map(Some),
        None => Ok(None),
    }
}

fn validate(kind: RecordKind, record: &Record) -> Result<()> {
    if record.name.trim().is_empty() {
        return Err(CoreError::Validation("a name is required".into()));
    }
    if record.price < Decimal::ZERO {
        return Err(CoreError::Validation("price cannot be negative".into()));
    }
    if kind == RecordKind::Subscription && record.start_date.is_none() {
        return Err(CoreError::Validation(
            "a start date is required for subscriptions".into(),
        ));
    }
    Ok(())
}
