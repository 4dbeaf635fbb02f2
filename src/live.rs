// Copyright (c) 2025 Pennyflow.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::warn;

use crate::aggregate::{monthly_aggregate, tag_aggregate};
use crate::categories::CategorySet;
use crate::errors::Result;
use crate::ledger;
use crate::models::{ChartBucket, Record, RecordKind};
use crate::store::{DocPath, Document, DocumentStore, Subscription};

/// Live mirror of one record collection. Holds the latest pushed snapshot
/// and recomputes chart series from it on demand; aggregation stays a pure
/// function of the snapshot, never incremental state. Dropping the feed
/// releases the subscription.
pub struct RecordFeed {
    records: Arc<Mutex<Vec<Record>>>,
    _sub: Subscription,
}

impl RecordFeed {
    pub fn open(store: &dyn DocumentStore, user_id: &str, kind: RecordKind) -> Result<Self> {
        let path = DocPath::records(user_id, kind);
        let records = Arc::new(Mutex::new(Vec::new()));
        let cache = Arc::clone(&records);
        let sub = store.subscribe_collection(
            &path,
            Arc::new(move |docs| {
                *cache.lock().expect("record cache") = decode_all(docs);
            }),
        )?;
        // Prime after subscribing; a notification racing this read only
        // replaces the cache with something at least as fresh.
        let initial = store.list(&path)?;
        *records.lock().expect("record cache") = decode_all(&initial);
        Ok(RecordFeed {
            records,
            _sub: sub,
        })
    }

    pub fn snapshot(&self) -> Vec<Record> {
        self.records.lock().expect("record cache").clone()
    }

    pub fn monthly(&self, reference: NaiveDate) -> Vec<ChartBucket> {
        monthly_aggregate(&self.snapshot(), reference)
    }

    pub fn by_tag(&self, categories: &CategorySet) -> Vec<ChartBucket> {
        tag_aggregate(&self.snapshot(), categories)
    }
}

/// Live mirror of the user's cached balance.
pub struct BalanceFeed {
    balance: Arc<Mutex<Decimal>>,
    _sub: Subscription,
}

impl BalanceFeed {
    pub fn open(store: &dyn DocumentStore, user_id: &str) -> Result<Self> {
        let balance = Arc::new(Mutex::new(Decimal::ZERO));
        let cache = Arc::clone(&balance);
        let sub = store.subscribe_document(
            &DocPath::user(user_id),
            Arc::new(move |doc: Option<&Document>| {
                let value = doc
                    .map(|doc| ledger::read_balance(&doc.fields))
                    .unwrap_or(Decimal::ZERO);
                *cache.lock().expect("balance cache") = value;
            }),
        )?;
        *balance.lock().expect("balance cache") = ledger::current_balance(store, user_id)?;
        Ok(BalanceFeed {
            balance,
            _sub: sub,
        })
    }

    pub fn current(&self) -> Decimal {
        *self.balance.lock().expect("balance cache")
    }
}

fn decode_all(docs: &[(String, Document)]) -> Vec<Record> {
    docs.iter()
        .filter_map(|(id, doc)| match Record::from_document(doc.fields.clone()) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(record = %id, error = %err, "skipping undecodable record");
                None
            }
        })
        .collect()
}
