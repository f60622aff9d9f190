use crate::error::{LedgerError, LedgerResult};
use crate::sheet::{RowRange, TableBackend, ValueInput, ValueRender};
use tracing::{debug, info};

pub const HEADER_ROW: u32 = 1;

/// Ordered column names persisted as the header row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    columns: Vec<String>,
}

impl Schema {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn into_columns(self) -> Vec<String> {
        self.columns
    }
}

/// Result of [`ensure_schema`]: whether the header already existed or was
/// just written from the candidate keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaState {
    Existing(Schema),
    Bootstrapped(Schema),
}

impl SchemaState {
    pub fn schema(&self) -> &Schema {
        match self {
            SchemaState::Existing(s) | SchemaState::Bootstrapped(s) => s,
        }
    }

    pub fn into_schema(self) -> Schema {
        match self {
            SchemaState::Existing(s) | SchemaState::Bootstrapped(s) => s,
        }
    }

    pub fn is_bootstrapped(&self) -> bool {
        matches!(self, SchemaState::Bootstrapped(_))
    }
}

/// Reads the header row. `None` means the table has never been written.
pub async fn read_schema(backend: &dyn TableBackend) -> LedgerResult<Option<Schema>> {
    let rows = backend
        .read_rows(RowRange::single(HEADER_ROW), ValueRender::FormattedValue)
        .await
        .map_err(|e| LedgerError::SchemaUnavailable(e.reason().to_string()))?;
    let header: Vec<String> = rows
        .into_iter()
        .next()
        .unwrap_or_default()
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect();
    if header.is_empty() {
        return Ok(None);
    }
    Ok(Some(Schema::new(header)))
}

/// Persists `candidate` as the header row of an empty table.
pub async fn bootstrap_schema(
    backend: &dyn TableBackend,
    candidate: Vec<String>,
) -> LedgerResult<Schema> {
    if candidate.is_empty() {
        return Err(LedgerError::invalid_input(
            "cannot create a schema with no columns",
        ));
    }
    backend
        .write_rows(
            RowRange::single(HEADER_ROW),
            &vec![candidate.clone()],
            ValueInput::Raw,
        )
        .await
        .map_err(|e| LedgerError::SchemaBootstrap(e.reason().to_string()))?;
    info!(
        sheet = backend.sheet_name(),
        columns = candidate.len(),
        "created header row"
    );
    Ok(Schema::new(candidate))
}

/// Returns the established schema, creating it from `candidate` when the
/// table is empty. An existing header is never rewritten.
pub async fn ensure_schema(
    backend: &dyn TableBackend,
    candidate: Vec<String>,
) -> LedgerResult<SchemaState> {
    if let Some(existing) = read_schema(backend).await? {
        debug!(columns = existing.len(), "header row already established");
        return Ok(SchemaState::Existing(existing));
    }
    let schema = bootstrap_schema(backend, candidate).await?;
    Ok(SchemaState::Bootstrapped(schema))
}

/// Appends `new_columns` after the existing ones and rewrites the header row.
/// Columns already present are skipped; nothing is reordered or removed.
pub async fn extend_schema(
    backend: &dyn TableBackend,
    schema: &Schema,
    new_columns: &[String],
) -> LedgerResult<Schema> {
    let mut columns = schema.columns().to_vec();
    for column in new_columns {
        if !columns.contains(column) {
            columns.push(column.clone());
        }
    }
    if columns.len() == schema.len() {
        return Ok(schema.clone());
    }
    backend
        .write_rows(
            RowRange::single(HEADER_ROW),
            &vec![columns.clone()],
            ValueInput::Raw,
        )
        .await?;
    info!(
        sheet = backend.sheet_name(),
        added = columns.len() - schema.len(),
        "extended header row"
    );
    Ok(Schema::new(columns))
}
