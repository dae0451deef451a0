//! Heading-row column mapping.
//!
//! Each visit field accepts a Spanish or an English heading. Lookup is
//! case-sensitive; within a row the first alias holding a value wins.

use serde_json::{Number, Value};

use super::reader::{Cell, Sheet, SheetRow};
use crate::models::visit::VisitPayload;

const NAME_HEADINGS: &[&str] = &["nombre", "name"];
const EMAIL_HEADINGS: &[&str] = &["email"];
const LATITUDE_HEADINGS: &[&str] = &["latitud", "latitude"];
const LONGITUDE_HEADINGS: &[&str] = &["longitud", "longitude"];

/// Candidate visit built from one spreadsheet row
#[derive(Debug, Clone)]
pub struct MappedRow {
    /// 1-based line in the source file
    pub line: usize,
    pub payload: VisitPayload,
}

/// Column indexes that may supply one field, in alias order
#[derive(Debug, Default)]
struct FieldColumns(Vec<usize>);

impl FieldColumns {
    fn resolve(headers: &[String], aliases: &[&str]) -> Self {
        Self(
            aliases
                .iter()
                .filter_map(|alias| headers.iter().position(|h| h == alias))
                .collect(),
        )
    }

    fn value(&self, row: &SheetRow) -> Option<Value> {
        self.0.iter().find_map(|&column| cell_value(row.cell(column)))
    }
}

/// Turn every non-blank data row into a candidate visit, in file order.
pub fn map_rows(sheet: &Sheet) -> Vec<MappedRow> {
    let name = FieldColumns::resolve(&sheet.headers, NAME_HEADINGS);
    let email = FieldColumns::resolve(&sheet.headers, EMAIL_HEADINGS);
    let latitude = FieldColumns::resolve(&sheet.headers, LATITUDE_HEADINGS);
    let longitude = FieldColumns::resolve(&sheet.headers, LONGITUDE_HEADINGS);

    sheet
        .rows
        .iter()
        .filter(|row| !row.is_blank())
        .map(|row| MappedRow {
            line: row.line,
            payload: VisitPayload {
                name: name.value(row),
                email: email.value(row),
                latitude: latitude.value(row),
                longitude: longitude.value(row),
            },
        })
        .collect()
}

fn cell_value(cell: &Cell) -> Option<Value> {
    match cell {
        Cell::Empty => None,
        Cell::Text(s) => Some(Value::String(s.clone())),
        Cell::Int(i) => Some(Value::Number((*i).into())),
        Cell::Float(f) => Number::from_f64(*f).map(Value::Number),
        Cell::Bool(b) => Some(Value::Bool(*b)),
    }
}
