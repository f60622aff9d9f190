//! A spreadsheet tab persisted as a JSON grid document through opendal.
//!
//! The document lives at `<root>/sheets/<sheet>.json`. Every mutation is a
//! read-modify-write of that document, serialized per document path, so an
//! append behaves as one atomic store-side operation for all handles in the
//! process.

use super::{AppendedRange, CellRef, Grid, RowRange, TableBackend, TextStyle, ValueInput, ValueRender};
use crate::error::{LedgerError, LedgerResult};
use crate::link;
use async_trait::async_trait;
use opendal::Operator;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct StoredCell {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub formula: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<TextStyle>,
}

impl StoredCell {
    fn entered(value: &str, input: ValueInput) -> Self {
        Self {
            value: value.to_string(),
            formula: input == ValueInput::UserEntered && value.starts_with('='),
            style: None,
        }
    }

    fn render(&self, render: ValueRender) -> String {
        match render {
            ValueRender::Formula => self.value.clone(),
            ValueRender::FormattedValue if self.formula => {
                link::hyperlink_display(&self.value).unwrap_or_else(|| self.value.clone())
            }
            ValueRender::FormattedValue => self.value.clone(),
        }
    }

    fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
struct SheetDocument {
    #[serde(default)]
    rows: Vec<Vec<StoredCell>>,
}

impl SheetDocument {
    /// Number of rows up to and including the last row holding a value.
    fn data_len(&self) -> usize {
        self.rows
            .iter()
            .rposition(|row| row.iter().any(|c| !c.is_empty()))
            .map(|idx| idx + 1)
            .unwrap_or(0)
    }

    fn cell_mut(&mut self, row: u32, column: usize) -> &mut StoredCell {
        let row_idx = row.saturating_sub(1) as usize;
        if self.rows.len() <= row_idx {
            self.rows.resize_with(row_idx + 1, Vec::new);
        }
        let cells = &mut self.rows[row_idx];
        if cells.len() <= column {
            cells.resize_with(column + 1, StoredCell::default);
        }
        &mut cells[column]
    }

    fn set_value(&mut self, row: u32, column: usize, value: &str, input: ValueInput) {
        let cell = self.cell_mut(row, column);
        let style = cell.style.take();
        *cell = StoredCell::entered(value, input);
        cell.style = style;
    }
}

fn document_locks() -> &'static Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>> {
    static LOCKS: OnceLock<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>> = OnceLock::new();
    LOCKS.get_or_init(|| Mutex::new(HashMap::new()))
}

fn lock_for(key: &str) -> LedgerResult<Arc<tokio::sync::Mutex<()>>> {
    let mut locks = document_locks()
        .lock()
        .map_err(|_| LedgerError::Transport("sheet lock registry poisoned".to_string()))?;
    Ok(locks
        .entry(key.to_string())
        .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
        .clone())
}

#[derive(Clone)]
pub struct OpendalTable {
    op: Operator,
    sheet: String,
    path: String,
}

impl OpendalTable {
    pub fn new(op: Operator, root: &str, sheet: &str) -> Self {
        let root = root.trim_matches('/');
        let path = if root.is_empty() {
            format!("sheets/{}.json", sheet)
        } else {
            format!("{}/sheets/{}.json", root, sheet)
        };
        Self {
            op,
            sheet: sheet.to_string(),
            path,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn lock_key(&self) -> String {
        let info = self.op.info();
        format!("{}:{}:{}:{}", info.scheme(), info.name(), info.root(), self.path)
    }

    async fn load(&self) -> LedgerResult<SheetDocument> {
        if !self.op.exists(&self.path).await? {
            return Ok(SheetDocument::default());
        }
        let bytes = self.op.read(&self.path).await?;
        let doc: SheetDocument = serde_json::from_slice(&bytes.to_vec())?;
        Ok(doc)
    }

    async fn store(&self, doc: &SheetDocument) -> LedgerResult<()> {
        let bytes = serde_json::to_vec(doc)?;
        self.op.write(&self.path, bytes).await?;
        Ok(())
    }

    /// Style currently applied to a cell, if any.
    pub async fn cell_style(&self, cell: CellRef) -> LedgerResult<Option<TextStyle>> {
        let doc = self.load().await?;
        Ok(doc
            .rows
            .get(cell.row.saturating_sub(1) as usize)
            .and_then(|row| row.get(cell.column))
            .and_then(|c| c.style))
    }
}

#[async_trait]
impl TableBackend for OpendalTable {
    fn sheet_name(&self) -> &str {
        &self.sheet
    }

    async fn read_rows(&self, range: RowRange, render: ValueRender) -> LedgerResult<Grid> {
        let doc = self.load().await?;
        let mut grid: Grid = doc
            .rows
            .iter()
            .enumerate()
            .filter(|(idx, _)| range.contains(*idx as u32 + 1))
            .map(|(_, row)| {
                let mut cells: Vec<String> = row.iter().map(|c| c.render(render)).collect();
                while cells.last().is_some_and(|c| c.is_empty()) {
                    cells.pop();
                }
                cells
            })
            .collect();
        while grid.last().is_some_and(|row| row.is_empty()) {
            grid.pop();
        }
        Ok(grid)
    }

    async fn write_rows(
        &self,
        range: RowRange,
        rows: &Grid,
        input: ValueInput,
    ) -> LedgerResult<()> {
        if let Some(end) = range.end {
            let capacity = end.saturating_sub(range.start) as usize + 1;
            if rows.len() > capacity {
                return Err(LedgerError::Transport(format!(
                    "{} rows do not fit in rows {}..={}",
                    rows.len(),
                    range.start,
                    end
                )));
            }
        }
        let lock = lock_for(&self.lock_key())?;
        let _guard = lock.lock().await;
        let mut doc = self.load().await?;
        for (offset, values) in rows.iter().enumerate() {
            let row = range.start + offset as u32;
            for (column, value) in values.iter().enumerate() {
                doc.set_value(row, column, value, input);
            }
        }
        self.store(&doc).await
    }

    async fn append_row(
        &self,
        values: &[String],
        input: ValueInput,
    ) -> LedgerResult<AppendedRange> {
        let lock = lock_for(&self.lock_key())?;
        let _guard = lock.lock().await;
        let mut doc = self.load().await?;
        let len = doc.data_len();
        doc.rows.truncate(len);
        doc.rows.push(
            values
                .iter()
                .map(|value| StoredCell::entered(value, input))
                .collect(),
        );
        self.store(&doc).await?;
        Ok(AppendedRange {
            row: len as u32 + 1,
            first_column: 0,
            last_column: values.len().saturating_sub(1),
        })
    }

    async fn format_cell(&self, cell: CellRef, style: &TextStyle) -> LedgerResult<()> {
        if cell.row == 0 {
            return Err(LedgerError::Transport("row numbers start at 1".to_string()));
        }
        let lock = lock_for(&self.lock_key())?;
        let _guard = lock.lock().await;
        let mut doc = self.load().await?;
        doc.cell_mut(cell.row, cell.column).style = Some(*style);
        self.store(&doc).await
    }
}
