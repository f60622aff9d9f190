use _policy_ledger_core::config::LedgerConfig;
use _policy_ledger_core::error::{LedgerError, LedgerResult};
use _policy_ledger_core::ledger::Ledger;
use _policy_ledger_core::sheet::{
    AppendedRange, CellRef, Grid, OpendalTable, RowRange, TableBackend, TextStyle, ValueInput,
    ValueRender,
};
use anyhow::Result;
use async_trait::async_trait;
use opendal::services::Memory;
use opendal::Operator;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

#[allow(dead_code)]
pub fn setup_operator() -> Result<Operator> {
    let builder = Memory::default();
    let op = Operator::new(builder)?.finish();
    Ok(op)
}

#[allow(dead_code)]
pub fn setup_table() -> Result<OpendalTable> {
    Ok(OpendalTable::new(setup_operator()?, "", "Sheet1"))
}

#[allow(dead_code)]
pub fn setup_ledger(config: LedgerConfig) -> Result<(Ledger, OpendalTable)> {
    let op = setup_operator()?;
    let table = OpendalTable::new(op.clone(), "", &config.sheet_name);
    let ledger = Ledger::new(Arc::new(table.clone()), op, config);
    Ok((ledger, table))
}

/// Wraps a table, counts mutating calls and injects failures on demand.
#[allow(dead_code)]
pub struct FaultyBackend<B> {
    pub inner: B,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
    pub fail_appends: AtomicBool,
    pub fail_formats: AtomicBool,
    pub writes: AtomicUsize,
    pub appends: AtomicUsize,
    pub formats: AtomicUsize,
}

#[allow(dead_code)]
impl<B: TableBackend> FaultyBackend<B> {
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            fail_appends: AtomicBool::new(false),
            fail_formats: AtomicBool::new(false),
            writes: AtomicUsize::new(0),
            appends: AtomicUsize::new(0),
            formats: AtomicUsize::new(0),
        }
    }

    pub fn mutations(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
            + self.appends.load(Ordering::SeqCst)
            + self.formats.load(Ordering::SeqCst)
    }

    fn refuse(flag: &AtomicBool, what: &str) -> LedgerResult<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(LedgerError::Transport(format!("injected {} failure", what)));
        }
        Ok(())
    }
}

#[async_trait]
impl<B: TableBackend> TableBackend for FaultyBackend<B> {
    fn sheet_name(&self) -> &str {
        self.inner.sheet_name()
    }

    async fn read_rows(&self, range: RowRange, render: ValueRender) -> LedgerResult<Grid> {
        Self::refuse(&self.fail_reads, "read")?;
        self.inner.read_rows(range, render).await
    }

    async fn write_rows(
        &self,
        range: RowRange,
        rows: &Grid,
        input: ValueInput,
    ) -> LedgerResult<()> {
        Self::refuse(&self.fail_writes, "write")?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.write_rows(range, rows, input).await
    }

    async fn append_row(
        &self,
        values: &[String],
        input: ValueInput,
    ) -> LedgerResult<AppendedRange> {
        Self::refuse(&self.fail_appends, "append")?;
        self.appends.fetch_add(1, Ordering::SeqCst);
        self.inner.append_row(values, input).await
    }

    async fn format_cell(&self, cell: CellRef, style: &TextStyle) -> LedgerResult<()> {
        Self::refuse(&self.fail_formats, "format")?;
        self.formats.fetch_add(1, Ordering::SeqCst);
        self.inner.format_cell(cell, style).await
    }
}

#[allow(dead_code)]
pub fn grid(rows: &[&[&str]]) -> Grid {
    rows.iter()
        .map(|row| row.iter().map(|c| c.to_string()).collect())
        .collect()
}
