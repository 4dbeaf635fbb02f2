// Copyright (c) 2025 Pennyflow.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

use crate::models::RecordKind;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("a {kind} named '{name}' already exists")]
    DuplicateName { kind: RecordKind, name: String },

    #[error("no {kind} named '{name}' exists")]
    NotFound { kind: RecordKind, name: String },

    #[error("invalid record: {0}")]
    Validation(String),

    #[error("document store unavailable: {0}")]
    Unavailable(String),

    #[error("malformed stored document: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
