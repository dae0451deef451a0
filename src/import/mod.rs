//! Spreadsheet import: format detection, sheet reading and column mapping.
//!
//! Everything here is synchronous and store-agnostic; the import service
//! drives it and decides what gets persisted.

pub mod mapping;
pub mod reader;

pub use mapping::{map_rows, MappedRow};
pub use reader::{read_sheet, Cell, ReadError, Sheet};

/// Accepted upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetFormat {
    Xlsx,
    Xls,
    Csv,
}

impl SpreadsheetFormat {
    pub const ACCEPTED: &'static str = "xlsx, xls, csv";

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "xlsx" => Some(Self::Xlsx),
            "xls" => Some(Self::Xls),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => Some(Self::Xlsx),
            "application/vnd.ms-excel" => Some(Self::Xls),
            "text/csv" | "application/csv" => Some(Self::Csv),
            _ => None,
        }
    }

    /// Pick the format of an upload.
    ///
    /// The file-name extension decides when there is one; the declared
    /// content type is only consulted for names without an extension.
    pub fn detect(file_name: Option<&str>, content_type: Option<&str>) -> Option<Self> {
        let extension = file_name
            .and_then(|name| std::path::Path::new(name).extension())
            .and_then(|ext| ext.to_str());

        match extension {
            Some(ext) => Self::from_extension(ext),
            None => content_type.and_then(Self::from_content_type),
        }
    }
}
