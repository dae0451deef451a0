//! Spreadsheet import service

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    import::{map_rows, read_sheet, SpreadsheetFormat},
    models::{
        import_report::{ImportReport, SkippedRow},
        visit::Visit,
    },
    repository::VisitsStore,
    validation::{validate_visit, FieldErrors},
};

/// An uploaded file as received from the client
#[derive(Debug, Clone, Default)]
pub struct SpreadsheetUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// What a finished import hands back: the batch report and the visit list
/// as it stands after the batch.
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub report: ImportReport,
    pub visits: Vec<Visit>,
}

#[derive(Clone)]
pub struct ImportService {
    store: Arc<dyn VisitsStore>,
}

impl ImportService {
    pub fn new(store: Arc<dyn VisitsStore>) -> Self {
        Self { store }
    }

    /// Import every valid row of `upload` on behalf of `user_id`.
    ///
    /// Invalid rows are skipped and reported; the batch carries on. An
    /// unsupported format is rejected before any byte is parsed. A corrupt
    /// file or a store failure aborts the batch, leaving rows stored so far
    /// in place.
    pub async fn import(&self, upload: SpreadsheetUpload, user_id: i64) -> AppResult<ImportOutcome> {
        let format = SpreadsheetFormat::detect(upload.file_name.as_deref(), upload.content_type.as_deref())
            .ok_or_else(|| {
                AppError::Validation(FieldErrors::single(
                    "file",
                    format!("The file field must be a file of type: {}.", SpreadsheetFormat::ACCEPTED),
                ))
            })?;

        let bytes = upload.bytes;
        let sheet = tokio::task::spawn_blocking(move || read_sheet(format, &bytes))
            .await
            .map_err(|e| AppError::Internal(format!("Spreadsheet reader panicked: {}", e)))?
            .map_err(|e| AppError::Import(format!("Unable to read spreadsheet: {}", e)))?;

        let mut report = ImportReport::default();

        for row in map_rows(&sheet) {
            match validate_visit(&row.payload) {
                Ok(visit) => {
                    self.store.insert(&visit, Some(user_id)).await?;
                    report.inserted_count += 1;
                }
                Err(errors) => {
                    tracing::debug!("Import: skipping row {}: {}", row.line, errors);
                    report.skipped_rows.push(SkippedRow { row: row.line, errors });
                }
            }
        }

        tracing::info!(
            "Import by user {} ({:?}): {} inserted, {} skipped",
            user_id,
            format,
            report.inserted_count,
            report.skipped_rows.len()
        );

        let visits = self.store.list().await?;
        Ok(ImportOutcome { report, visits })
    }
}
