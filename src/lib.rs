// Copyright (c) 2025 Pennyflow.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod aggregate;
pub mod categories;
pub mod errors;
pub mod ledger;
pub mod live;
pub mod models;
pub mod repo;
pub mod store;
pub mod utils;
