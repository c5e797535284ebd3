//! Reads the ordered identifier list from a spreadsheet or a plain text file.

use std::collections::HashSet;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use crate::ReportError;

const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];
const USERNAME_HEADER: &str = "username";

/// Loads identifiers from `path`.
///
/// Spreadsheets are read from `sheet` (or the first worksheet). When the
/// first row has a `username` header cell, that column is read below it;
/// otherwise the first column is read from the top. Any other file is read
/// as one identifier per line.
///
/// Values are trimmed, a leading `@` is removed, blanks are skipped, and
/// duplicates are dropped keeping the first occurrence.
///
/// # Errors
///
/// Returns a [`ReportError`] if the file is missing or unreadable, or the
/// requested worksheet does not exist.
pub fn load_identifiers(path: &Path, sheet: Option<&str>) -> Result<Vec<String>, ReportError> {
    let raw = if is_spreadsheet(path) {
        read_spreadsheet(path, sheet)?
    } else {
        std::fs::read_to_string(path)
            .map_err(|source| ReportError::Io {
                path: path.to_path_buf(),
                source,
            })?
            .lines()
            .map(str::to_owned)
            .collect()
    };

    let identifiers = normalize(raw);
    tracing::info!(path = %path.display(), count = identifiers.len(), "loaded identifiers");
    Ok(identifiers)
}

fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| SPREADSHEET_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

fn read_spreadsheet(path: &Path, sheet: Option<&str>) -> Result<Vec<String>, ReportError> {
    let spreadsheet_err = |source| ReportError::Spreadsheet {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook = open_workbook_auto(path).map_err(spreadsheet_err)?;
    let names = workbook.sheet_names();
    let name = match sheet {
        Some(wanted) => names
            .iter()
            .find(|n| n.as_str() == wanted)
            .cloned()
            .ok_or_else(|| ReportError::SheetNotFound {
                path: path.to_path_buf(),
                sheet: wanted.to_owned(),
            })?,
        None => names
            .first()
            .cloned()
            .ok_or_else(|| ReportError::EmptyWorkbook(path.to_path_buf()))?,
    };

    let range = workbook.worksheet_range(&name).map_err(spreadsheet_err)?;
    let mut rows = range.rows();

    let header_col = range.rows().next().and_then(|first| {
        first
            .iter()
            .position(|c| cell_text(c).trim().eq_ignore_ascii_case(USERNAME_HEADER))
    });

    let col = match header_col {
        Some(col) => {
            rows.next();
            col
        }
        None => 0,
    };

    Ok(rows
        .filter_map(|row| row.get(col))
        .map(cell_text)
        .collect())
}

/// Renders a cell as the identifier text a human would read in it.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(n) => n.to_string(),
        #[allow(clippy::cast_possible_truncation)]
        Data::Float(f) if f.fract() == 0.0 && f.is_finite() => (*f as i64).to_string(),
        other => other.to_string(),
    }
}

fn normalize(raw: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.into_iter()
        .filter_map(|value| {
            let trimmed = value.trim();
            let trimmed = trimmed.strip_prefix('@').unwrap_or(trimmed).trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        })
        .filter(|id| seen.insert(id.clone()))
        .collect()
}
