//! The backing table service: a spreadsheet tab addressed by 1-based rows and
//! 0-based columns, with range reads, range overwrites, atomic appends and
//! per-cell text styling.

pub mod a1;
pub mod opendal_table;
pub mod sheets_api;

use crate::error::LedgerResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use opendal_table::OpendalTable;
pub use sheets_api::{SheetsApiTable, StaticToken, TokenProvider};

/// Rows as returned by a read. Trailing empty cells and trailing empty rows are
/// omitted, the way spreadsheet services report them.
pub type Grid = Vec<Vec<String>>;

/// How written strings are interpreted by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueInput {
    /// Stored literally, a leading `=` included.
    Raw,
    /// Parsed as if typed by a user, so formulas are evaluated.
    UserEntered,
}

impl ValueInput {
    pub fn as_api_str(self) -> &'static str {
        match self {
            ValueInput::Raw => "RAW",
            ValueInput::UserEntered => "USER_ENTERED",
        }
    }
}

/// How cells are rendered by a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueRender {
    /// Evaluated display text.
    FormattedValue,
    /// Formulas as entered.
    Formula,
}

impl ValueRender {
    pub fn as_api_str(self) -> &'static str {
        match self {
            ValueRender::FormattedValue => "FORMATTED_VALUE",
            ValueRender::Formula => "FORMULA",
        }
    }
}

/// Inclusive span of 1-based rows. `end: None` runs to the last row with data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    pub start: u32,
    pub end: Option<u32>,
}

impl RowRange {
    pub fn single(row: u32) -> Self {
        Self {
            start: row,
            end: Some(row),
        }
    }

    pub fn from_row(start: u32) -> Self {
        Self { start, end: None }
    }

    pub fn contains(&self, row: u32) -> bool {
        row >= self.start && self.end.is_none_or(|end| row <= end)
    }
}

/// A single cell: 1-based row, 0-based column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    pub row: u32,
    pub column: usize,
}

impl CellRef {
    pub fn to_a1(self, sheet: &str) -> String {
        format!("{}!{}{}", sheet, a1::column_letters(self.column), self.row)
    }
}

/// Location of the row written by an append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendedRange {
    pub row: u32,
    pub first_column: usize,
    pub last_column: usize,
}

impl AppendedRange {
    pub fn cell(&self, column: usize) -> CellRef {
        CellRef {
            row: self.row,
            column,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

/// Style-only update for one cell. Only text color and underline are touched.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub foreground: Rgb,
    pub underline: bool,
}

#[async_trait]
pub trait TableBackend: Send + Sync {
    /// Name of the tab this backend addresses.
    fn sheet_name(&self) -> &str;

    async fn read_rows(&self, range: RowRange, render: ValueRender) -> LedgerResult<Grid>;

    /// Overwrites the cells of `range`, starting at column A.
    async fn write_rows(&self, range: RowRange, rows: &Grid, input: ValueInput)
        -> LedgerResult<()>;

    /// Inserts one row after all existing data. Atomic on the store side.
    async fn append_row(&self, values: &[String], input: ValueInput)
        -> LedgerResult<AppendedRange>;

    async fn format_cell(&self, cell: CellRef, style: &TextStyle) -> LedgerResult<()>;
}
