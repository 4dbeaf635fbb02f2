// Copyright (c) 2025 Pennyflow.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::errors::{CoreError, Result};
use crate::store::Fields;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Purchase,
    Subscription,
}

impl RecordKind {
    /// Collection segment under `users/{userId}` for this kind.
    pub fn collection(&self) -> &'static str {
        match self {
            RecordKind::Purchase => "purchases",
            RecordKind::Subscription => "subscriptions",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Purchase => write!(f, "purchase"),
            RecordKind::Subscription => write!(f, "subscription"),
        }
    }
}

/// A purchase or subscription entry. The name doubles as the document id,
/// which is what enforces per-user uniqueness at the storage layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub name: String,
    pub price: Decimal,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_datetime"
    )]
    pub date: Option<DateTime<Utc>>,
    #[serde(
        default,
        rename = "startDate",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_date"
    )]
    pub start_date: Option<NaiveDate>,
    pub withdrawing: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Record {
    pub fn to_fields(&self) -> Result<Fields> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(CoreError::Validation(
                "record did not encode to a document".into(),
            )),
            Err(err) => Err(CoreError::Validation(err.to_string())),
        }
    }

    pub fn from_document(fields: Fields) -> Result<Self> {
        serde_json::from_value(Value::Object(fields))
            .map_err(|err| CoreError::Malformed(err.to_string()))
    }
}

/// Profile document at `users/{userId}`. Created by the external sign-up
/// flow; this crate only ever touches its `balance` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub balance: Decimal,
}

/// One derived aggregate slot, by month or by tag. Never persisted;
/// regenerated from scratch on every aggregation call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartBucket {
    pub name: String,
    pub income: Decimal,
    pub expenses: Decimal,
}

impl ChartBucket {
    pub fn zero(name: impl Into<String>) -> Self {
        ChartBucket {
            name: name.into(),
            income: Decimal::ZERO,
            expenses: Decimal::ZERO,
        }
    }
}

// A record with an unreadable date is unbucketable, not an error, so date
// decoding never fails the whole document.
fn lenient_datetime<'de, D>(de: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(de)?;
    Ok(raw
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc)))
}

fn lenient_date<'de, D>(de: D) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(de)?;
    Ok(raw
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()))
}
