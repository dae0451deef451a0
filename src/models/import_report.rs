//! Import report models

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::validation::FieldErrors;

/// A spreadsheet row that failed validation and was not stored.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct SkippedRow {
    /// 1-based line in the spreadsheet (the heading row is line 1)
    pub row: usize,
    #[schema(value_type = Object)]
    pub errors: FieldErrors,
}

/// Per-batch outcome returned alongside the visit list.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ImportReport {
    pub inserted_count: usize,
    #[serde(default)]
    pub skipped_rows: Vec<SkippedRow>,
}
