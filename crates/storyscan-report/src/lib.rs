//! Spreadsheet I/O: the identifier loader and the bilingual report exporter.

pub mod export;
pub mod loader;

use std::path::PathBuf;

use thiserror::Error;

pub use export::{export_report, persian_header};
pub use loader::load_identifiers;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open spreadsheet {path}: {source}")]
    Spreadsheet {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("worksheet \"{sheet}\" not found in {path}")]
    SheetNotFound { path: PathBuf, sheet: String },

    #[error("spreadsheet {0} has no worksheets")]
    EmptyWorkbook(PathBuf),

    #[error("failed to write workbook: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}
