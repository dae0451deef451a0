//! Spreadsheet readers.
//!
//! Workbooks go through calamine (first worksheet only), CSV through the
//! csv crate. Both produce the same [`Sheet`]: a heading row plus data rows
//! tagged with their line number in the original file.

use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, Range, Reader, Xls, Xlsx};
use thiserror::Error;

use super::SpreadsheetFormat;

/// A single cell value
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Cell {
    fn text(value: &str) -> Self {
        if value.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Heading text of the cell, trimmed
    fn heading(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Int(i) => i.to_string(),
            Cell::Float(f) => f.to_string(),
            Cell::Bool(b) => b.to_string(),
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::String(s) => Cell::text(s),
            Data::Int(i) => Cell::Int(*i),
            Data::Float(f) => Cell::Float(*f),
            Data::Bool(b) => Cell::Bool(*b),
            other => Cell::text(&other.to_string()),
        }
    }
}

/// One data row
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    /// 1-based line in the source file
    pub line: usize,
    pub cells: Vec<Cell>,
}

impl SheetRow {
    pub fn cell(&self, column: usize) -> &Cell {
        self.cells.get(column).unwrap_or(&Cell::Empty)
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(Cell::is_empty)
    }
}

/// Heading row and data rows of an uploaded spreadsheet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    pub headers: Vec<String>,
    pub rows: Vec<SheetRow>,
}

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("unreadable workbook: {0}")]
    Workbook(String),

    #[error("workbook has no worksheet")]
    NoWorksheet,

    #[error("unreadable CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Parse `bytes` as a spreadsheet of the given format.
///
/// An empty file yields an empty sheet; a corrupt one is an error.
pub fn read_sheet(format: SpreadsheetFormat, bytes: &[u8]) -> Result<Sheet, ReadError> {
    match format {
        SpreadsheetFormat::Xlsx => read_workbook::<Xlsx<_>>(bytes),
        SpreadsheetFormat::Xls => read_workbook::<Xls<_>>(bytes),
        SpreadsheetFormat::Csv => read_csv(bytes),
    }
}

fn read_workbook<'a, R>(bytes: &'a [u8]) -> Result<Sheet, ReadError>
where
    R: Reader<Cursor<&'a [u8]>>,
    R::Error: std::fmt::Display,
{
    let mut workbook: R = open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|e: R::Error| ReadError::Workbook(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ReadError::NoWorksheet)?
        .map_err(|e| ReadError::Workbook(e.to_string()))?;

    Ok(sheet_from_range(&range))
}

fn sheet_from_range(range: &Range<Data>) -> Sheet {
    let first_line = range.start().map(|(row, _)| row as usize + 1).unwrap_or(1);
    let mut rows = range.rows().enumerate();

    let headers = match rows.next() {
        Some((_, cells)) => cells.iter().map(|c| Cell::from(c).heading()).collect(),
        None => return Sheet::default(),
    };

    let rows = rows
        .map(|(offset, cells)| SheetRow {
            line: first_line + offset,
            cells: cells.iter().map(Cell::from).collect(),
        })
        .collect();

    Sheet { headers, rows }
}

fn read_csv(bytes: &[u8]) -> Result<Sheet, ReadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut sheet = Sheet::default();
    let mut records = reader.byte_records();

    match records.next() {
        Some(record) => {
            let record = record?;
            sheet.headers = record
                .iter()
                .map(|field| {
                    String::from_utf8_lossy(field)
                        .trim_start_matches('\u{feff}')
                        .trim()
                        .to_string()
                })
                .collect();
        }
        None => return Ok(sheet),
    }

    for record in records {
        let record = record?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(sheet.rows.len() + 2);
        sheet.rows.push(SheetRow {
            line,
            cells: record
                .iter()
                .map(|field| Cell::text(&String::from_utf8_lossy(field)))
                .collect(),
        });
    }

    Ok(sheet)
}
