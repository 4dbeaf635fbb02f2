// Copyright (c) 2025 Pennyflow.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Datelike, NaiveDate};

use crate::categories::CategorySet;
use crate::models::{ChartBucket, Record};

/// Catch-all bucket for untagged records and tags outside the category set.
pub const OTHER_BUCKET: &str = "Other";

const MONTH_ABBREV: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Fold records into exactly 12 month buckets covering the window that ends
/// at the reference month, oldest first. A record lands in the bucket whose
/// calendar year and month match its date; dateless records land nowhere.
/// Bucket labels carry the year only when it differs from the reference
/// year ("Apr 2023" vs "Mar").
pub fn monthly_aggregate(records: &[Record], reference: NaiveDate) -> Vec<ChartBucket> {
    let mut buckets = Vec::with_capacity(12);
    for back in (0..12i32).rev() {
        let months = reference.year() * 12 + reference.month0() as i32 - back;
        let year = months.div_euclid(12);
        let month0 = months.rem_euclid(12) as u32;
        let name = if year == reference.year() {
            MONTH_ABBREV[month0 as usize].to_string()
        } else {
            format!("{} {}", MONTH_ABBREV[month0 as usize], year)
        };

        let mut bucket = ChartBucket::zero(name);
        for record in records {
            let Some(date) = record.date else { continue };
            let date = date.date_naive();
            if date.year() == year && date.month0() == month0 {
                if record.withdrawing {
                    bucket.expenses += record.price;
                } else {
                    bucket.income += record.price;
                }
            }
        }
        buckets.push(bucket);
    }
    buckets
}

/// Fold records into one bucket per category, in set order, plus a single
/// trailing "Other" bucket. A record counts toward the category whose value
/// its tag matches exactly; any other tag, and no tag at all, counts toward
/// "Other".
pub fn tag_aggregate(records: &[Record], categories: &CategorySet) -> Vec<ChartBucket> {
    let mut buckets: Vec<ChartBucket> = categories
        .iter()
        .map(|category| ChartBucket::zero(category.label.clone()))
        .collect();
    let mut other = ChartBucket::zero(OTHER_BUCKET);

    for record in records {
        let slot = record
            .tag
            .as_deref()
            .and_then(|tag| categories.position(tag));
        let bucket = match slot {
            Some(index) => &mut buckets[index],
            None => &mut other,
        };
        if record.withdrawing {
            bucket.expenses += record.price;
        } else {
            bucket.income += record.price;
        }
    }

    buckets.push(other);
    buckets
}
