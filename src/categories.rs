// Copyright (c) 2025 Pennyflow.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub label: String,
    pub value: String,
}

impl Category {
    pub fn new(label: &str, value: &str) -> Self {
        Category {
            label: label.to_string(),
            value: value.to_string(),
        }
    }
}

static DEFAULT_CATEGORIES: Lazy<Vec<Category>> = Lazy::new(|| {
    vec![
        Category::new("Housing", "housing"),
        Category::new("Transportation", "transportation"),
        Category::new("Food", "food"),
        Category::new("Utilities", "utilities"),
        Category::new("Clothing", "clothing"),
        Category::new("Medical", "medical"),
        Category::new("Insurance", "insurance"),
        Category::new("Household Items", "household_items"),
        Category::new("Personal", "personal"),
        Category::new("Entertainment", "entertainment"),
        Category::new("Debt", "debt"),
        Category::new("Education", "education"),
        Category::new("Savings", "savings"),
        Category::new("Gifts", "gifts"),
    ]
});

/// Ordered set of known spending categories. Aggregation takes this as a
/// parameter so the list can grow without touching aggregation logic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySet {
    categories: Vec<Category>,
}

impl CategorySet {
    pub fn new(categories: Vec<Category>) -> Self {
        CategorySet { categories }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    /// Index of the category whose `value` matches the given tag exactly.
    pub fn position(&self, tag: &str) -> Option<usize> {
        self.categories.iter().position(|c| c.value == tag)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl Default for CategorySet {
    fn default() -> Self {
        CategorySet {
            categories: DEFAULT_CATEGORIES.clone(),
        }
    }
}
