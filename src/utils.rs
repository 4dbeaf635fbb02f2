// Copyright (c) 2025 Pennyflow.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, NaiveDate, Utc};
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use rust_decimal::Decimal;

use crate::errors::{CoreError, Result};
use crate::models::{ChartBucket, Record};

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| CoreError::Validation(format!("Invalid date '{}', expected YYYY-MM-DD", s)))
}

pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| CoreError::Validation(format!("Invalid timestamp '{}', expected RFC 3339", s)))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .map_err(|_| CoreError::Validation(format!("Invalid decimal '{}'", s)))
}

/// Display form of a currency amount: two decimals, thousands separators,
/// dollar prefix. `-30` comes out as `-$30.00`, `1234.5` as `$1,234.50`.
pub fn fmt_money(d: &Decimal) -> String {
    let rounded = d.round_dp(2);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let plain = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, frac_part)
}

/// Sort for display: newest first, dateless records last.
pub fn sort_for_display(records: &mut [Record]) {
    records.sort_by(|a, b| b.date.cmp(&a.date));
}

/// The `n` most recent records, the dashboard's short-table view.
pub fn recent(records: &[Record], n: usize) -> Vec<Record> {
    let mut sorted = records.to_vec();
    sort_for_display(&mut sorted);
    sorted.truncate(n);
    sorted
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn record_table(records: &[Record]) -> Table {
    let rows = records
        .iter()
        .map(|r| {
            // the dashboard marks deposits, not withdrawals
            let price = if r.withdrawing {
                fmt_money(&r.price)
            } else {
                format!("+{}", fmt_money(&r.price))
            };
            vec![
                r.name.clone(),
                r.date
                    .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                    .or_else(|| r.start_date.map(|d| d.to_string()))
                    .unwrap_or_else(|| "(not specified)".to_string()),
                r.tag.clone().unwrap_or_default(),
                price,
                r.description.clone().unwrap_or_default(),
            ]
        })
        .collect();
    pretty_table(&["Name", "Date", "Tag", "Price", "Description"], rows)
}

pub fn bucket_table(buckets: &[ChartBucket]) -> Table {
    let rows = buckets
        .iter()
        .map(|b| {
            vec![
                b.name.clone(),
                fmt_money(&b.income),
                fmt_money(&b.expenses),
            ]
        })
        .collect();
    pretty_table(&["Bucket", "Income", "Expenses"], rows)
}
