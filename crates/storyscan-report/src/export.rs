//! Bilingual workbook export of the full success and failure logs.

use std::path::Path;

use chrono::{DateTime, FixedOffset, Utc};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use storyscan_db::{FailureRow, UserRow};

use crate::ReportError;

pub const USERS_SHEET_EN: &str = "Users (EN)";
pub const USERS_SHEET_FA: &str = "کاربران (FA)";
pub const INVALID_SHEET_EN: &str = "Invalid (EN)";
pub const INVALID_SHEET_FA: &str = "نامعتبرها (FA)";

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const COLUMN_WIDTH: f64 = 20.0;

const USER_COLUMNS: &[&str] = &[
    "username",
    "full_name",
    "is_private",
    "is_verified",
    "profile_pic_url",
    "mention",
    "follower_count",
    "following_count",
    "time",
];

const INVALID_COLUMNS: &[&str] = &["username", "category", "error_message", "time"];

/// Persian header for a column key; unknown keys pass through unchanged.
#[must_use]
pub fn persian_header(key: &str) -> &str {
    match key {
        "username" => "نام کاربری",
        "full_name" => "نام کامل",
        "is_private" => "خصوصی",
        "is_verified" => "تأیید شده",
        "profile_pic_url" => "عکس پروفایل",
        "mention" => "منشن",
        "follower_count" => "تعداد فالوئر",
        "following_count" => "تعداد فالووینگ",
        "time" => "زمان دریافت",
        "error_message" => "پیام خطا",
        "category" => "دسته",
        other => other,
    }
}

enum Cell {
    Text(String),
    Bool(bool),
    Number(i64),
}

/// Writes the four-sheet report to `path`, overwriting any existing file.
///
/// Capture times are rendered in `offset`.
///
/// # Errors
///
/// Returns [`ReportError::Xlsx`] if a sheet cannot be built or the file
/// cannot be saved.
pub fn export_report(
    path: &Path,
    users: &[UserRow],
    failures: &[FailureRow],
    offset: FixedOffset,
) -> Result<(), ReportError> {
    let user_rows: Vec<Vec<Cell>> = users.iter().map(|u| user_cells(u, offset)).collect();
    let failure_rows: Vec<Vec<Cell>> = failures.iter().map(|f| failure_cells(f, offset)).collect();

    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    for (name, persian, columns, rows) in [
        (USERS_SHEET_EN, false, USER_COLUMNS, &user_rows),
        (USERS_SHEET_FA, true, USER_COLUMNS, &user_rows),
        (INVALID_SHEET_EN, false, INVALID_COLUMNS, &failure_rows),
        (INVALID_SHEET_FA, true, INVALID_COLUMNS, &failure_rows),
    ] {
        let sheet = workbook.add_worksheet();
        sheet.set_name(name)?;
        write_sheet(sheet, &header, columns, persian, rows)?;
    }

    workbook.save(path)?;
    tracing::info!(
        path = %path.display(),
        users = users.len(),
        failures = failures.len(),
        "report exported"
    );
    Ok(())
}

fn write_sheet(
    sheet: &mut Worksheet,
    header: &Format,
    columns: &[&str],
    persian: bool,
    rows: &[Vec<Cell>],
) -> Result<(), ReportError> {
    for (col, key) in (0u16..).zip(columns) {
        let title = if persian { persian_header(key) } else { key };
        sheet.write_string_with_format(0, col, title, header)?;
        sheet.set_column_width(col, COLUMN_WIDTH)?;
    }

    for (row, cells) in (1u32..).zip(rows) {
        for (col, cell) in (0u16..).zip(cells) {
            match cell {
                Cell::Text(text) => {
                    sheet.write_string(row, col, text)?;
                }
                Cell::Bool(value) => {
                    sheet.write_boolean(row, col, *value)?;
                }
                #[allow(clippy::cast_precision_loss)]
                Cell::Number(n) => {
                    sheet.write_number(row, col, *n as f64)?;
                }
            }
        }
    }
    Ok(())
}

fn render_time(at: DateTime<Utc>, offset: FixedOffset) -> String {
    at.with_timezone(&offset).format(TIME_FORMAT).to_string()
}

fn user_cells(user: &UserRow, offset: FixedOffset) -> Vec<Cell> {
    vec![
        Cell::Text(user.username.clone()),
        Cell::Text(user.full_name.clone()),
        Cell::Bool(user.is_private),
        Cell::Bool(user.is_verified),
        Cell::Text(user.profile_pic_url.clone()),
        Cell::Text(user.mention.clone().unwrap_or_default()),
        Cell::Number(user.follower_count),
        Cell::Number(user.following_count),
        Cell::Text(render_time(user.captured_at, offset)),
    ]
}

fn failure_cells(failure: &FailureRow, offset: FixedOffset) -> Vec<Cell> {
    vec![
        Cell::Text(failure.username.clone()),
        Cell::Text(failure.category.clone()),
        Cell::Text(failure.error_message.clone()),
        Cell::Text(render_time(failure.captured_at, offset)),
    ]
}
