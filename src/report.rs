//! Spreadsheet export of a player's result rows.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::error::AppError;
use crate::stats::ResultRow;

pub const COLUMNS: [&str; 7] = [
    "Result", "Champion", "Lane", "Kills", "Deaths", "Assists", "Duration",
];

const SHEET_NAME: &str = "Matches";

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
}

/// Header row plus one row of cells per match, in the order given.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    rows: Vec<[Cell; 7]>,
}

impl ReportTable {
    pub fn from_rows(rows: &[ResultRow]) -> Self {
        Self {
            rows: rows.iter().map(Self::cells).collect(),
        }
    }

    fn cells(row: &ResultRow) -> [Cell; 7] {
        [
            Cell::Text(row.result.to_string()),
            Cell::Text(row.champion.clone()),
            Cell::Text(row.lane.clone()),
            Cell::Number(f64::from(row.kills)),
            Cell::Number(f64::from(row.deaths)),
            Cell::Number(f64::from(row.assists)),
            Cell::Text(row.duration.clone()),
        ]
    }

    pub fn headers(&self) -> &'static [&'static str; 7] {
        &COLUMNS
    }

    pub fn rows(&self) -> &[[Cell; 7]] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// `{dir}/report_{game_name}_{YYYY-MM-DD}.xlsx`
pub fn report_path(dir: &Path, game_name: &str, date: NaiveDate) -> PathBuf {
    dir.join(format!("report_{}_{}.xlsx", game_name, date.format("%Y-%m-%d")))
}

/// Writes `table` to `path`, replacing whatever file is already there.
pub fn write_report(path: &Path, table: &ReportTable) -> Result<(), AppError> {
    build_workbook(table)
        .and_then(|mut workbook| workbook.save(path))
        .map_err(|source| AppError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn build_workbook(table: &ReportTable) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let header_fmt = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, header) in table.headers().iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &header_fmt)?;
    }

    for (i, cells) in table.rows().iter().enumerate() {
        let row = (i + 1) as u32;
        for (col, cell) in cells.iter().enumerate() {
            match cell {
                Cell::Text(text) => sheet.write_string(row, col as u16, text)?,
                Cell::Number(n) => sheet.write_number(row, col as u16, *n)?,
            };
        }
    }

    Ok(workbook)
}
