// Copyright (c) 2025 Pennyflow.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use crate::errors::{CoreError, Result};
use crate::models::UserProfile;
use crate::store::{DocPath, DocumentStore, Fields};

pub const BALANCE_FIELD: &str = "balance";

/// Direction of a balance adjustment: `Apply` when a record is created,
/// `Reverse` when it is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Apply,
    Reverse,
}

/// Adjust the user's cached balance for one record. A withdrawal lowers the
/// balance, a deposit raises it; `Reverse` is the exact inverse, so a
/// create followed by a delete restores the starting balance bit for bit.
///
/// The write goes through `transform`, so stores with an atomic
/// read-modify-write never lose concurrent adjustments. A missing profile
/// document is treated as balance 0, not an error.
pub fn apply_record_effect(
    store: &dyn DocumentStore,
    user_id: &str,
    amount: Decimal,
    withdrawing: bool,
    effect: Effect,
) -> Result<Decimal> {
    if amount < Decimal::ZERO {
        return Err(CoreError::Validation("amount cannot be negative".into()));
    }
    let signed = if withdrawing { -amount } else { amount };
    let delta = match effect {
        Effect::Apply => signed,
        Effect::Reverse => -signed,
    };

    let mut updated = Decimal::ZERO;
    store.transform(&DocPath::user(user_id), &mut |current| {
        let mut fields = current.map(|doc| doc.fields.clone()).unwrap_or_default();
        updated = read_balance(&fields) + delta;
        fields.insert(BALANCE_FIELD.into(), Value::String(updated.to_string()));
        fields
    })?;
    debug!(user = user_id, %delta, balance = %updated, "balance adjusted");
    Ok(updated)
}

/// Current cached balance; 0 when the profile document does not exist.
pub fn current_balance(store: &dyn DocumentStore, user_id: &str) -> Result<Decimal> {
    Ok(store
        .get(&DocPath::user(user_id))?
        .map(|doc| read_balance(&doc.fields))
        .unwrap_or(Decimal::ZERO))
}

pub fn load_profile(store: &dyn DocumentStore, user_id: &str) -> Result<Option<UserProfile>> {
    match store.get(&DocPath::user(user_id))? {
        Some(doc) => serde_json::from_value(Value::Object(doc.fields))
            .map(Some)
            .map_err(|err| CoreError::Malformed(err.to_string())),
        None => Ok(None),
    }
}

/// Balance out of raw profile fields. The original client stored plain JSON
/// numbers, so both string and numeric encodings are accepted; anything
/// else defaults to 0.
pub fn read_balance(fields: &Fields) -> Decimal {
    fields
        .get(BALANCE_FIELD)
        .and_then(|value| match value {
            Value::String(s) => s.trim().parse().ok(),
            Value::Number(_) => serde_json::from_value(value.clone()).ok(),
            _ => None,
        })
        .unwrap_or(Decimal::ZERO)
}
