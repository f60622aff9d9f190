use crate::config::{LedgerConfig, UnknownFieldPolicy};
use crate::error::{
    FormattingWarning, LedgerError, LedgerResult, BLANK_ROW_REFUSED, EMPTY_OR_INVALID_INPUT,
};
use crate::link;
use crate::record::{CellValue, Record};
use crate::schema::{self, Schema};
use crate::sheet::{AppendedRange, TableBackend, ValueInput};
use serde::Serialize;
use tracing::{debug, info, warn};

/// A successful append. `warnings` carries failures of the cosmetic styling
/// step; the row is persisted regardless.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppendOutcome {
    pub row: u32,
    pub bootstrapped: bool,
    pub dropped_fields: Vec<String>,
    pub warnings: Vec<FormattingWarning>,
}

/// Serializable `{ok, ...}` form of an append result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppendReport {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<u32>,
    pub warnings: Vec<String>,
}

impl From<&LedgerResult<AppendOutcome>> for AppendReport {
    fn from(result: &LedgerResult<AppendOutcome>) -> Self {
        match result {
            Ok(outcome) => Self {
                ok: true,
                kind: None,
                reason: None,
                row: Some(outcome.row),
                warnings: outcome.warnings.iter().map(|w| w.to_string()).collect(),
            },
            Err(err) => Self {
                ok: false,
                kind: Some(err.kind().to_string()),
                reason: Some(err.reason().to_string()),
                row: None,
                warnings: Vec::new(),
            },
        }
    }
}

/// Values of `record` in `schema` order; absent keys and nulls become `""`.
pub fn project(record: &Record, schema: &Schema) -> Vec<String> {
    schema
        .columns()
        .iter()
        .map(|column| {
            record
                .get(column)
                .map(CellValue::to_cell_text)
                .unwrap_or_default()
        })
        .collect()
}

/// Record keys the schema does not know, in record order.
pub fn unknown_fields(record: &Record, schema: &Schema) -> Vec<String> {
    record
        .keys()
        .filter(|key| !schema.contains(key))
        .map(str::to_string)
        .collect()
}

/// Rewrites link-column values into hyperlink formulas.
pub fn apply_link_formulas(values: Vec<String>, schema: &Schema, config: &LedgerConfig) -> Vec<String> {
    let aliases = &config.link_fields.aliases;
    values
        .into_iter()
        .zip(schema.columns())
        .map(|(value, column)| {
            if link::is_link_column(column, aliases) {
                link::render_link_value(&value, &config.link_fields).unwrap_or(value)
            } else {
                value
            }
        })
        .collect()
}

fn all_blank(values: &[String]) -> bool {
    values.iter().all(String::is_empty)
}

async fn resolve_schema(
    backend: &dyn TableBackend,
    record: &Record,
    config: &LedgerConfig,
) -> LedgerResult<(Schema, bool, Vec<String>)> {
    let Some(existing) = schema::read_schema(backend).await? else {
        // Refuse before the header is written so a blank first record leaves
        // the table untouched.
        if record.iter().all(|(_, v)| v.is_blank()) {
            return Err(LedgerError::invalid_input(BLANK_ROW_REFUSED));
        }
        let candidate: Vec<String> = record.keys().map(str::to_string).collect();
        let schema = schema::bootstrap_schema(backend, candidate).await?;
        return Ok((schema, true, Vec::new()));
    };

    let unknown = unknown_fields(record, &existing);
    if unknown.is_empty() {
        return Ok((existing, false, Vec::new()));
    }
    match config.unknown_fields {
        UnknownFieldPolicy::Drop => {
            warn!(fields = ?unknown, "dropping fields missing from the header row");
            Ok((existing, false, unknown))
        }
        UnknownFieldPolicy::Error => Err(LedgerError::invalid_input(format!(
            "unknown fields: {}",
            unknown.join(", ")
        ))),
        UnknownFieldPolicy::Extend => {
            let extended = schema::extend_schema(backend, &existing, &unknown).await?;
            Ok((extended, false, Vec::new()))
        }
    }
}

async fn style_link_cell(
    backend: &dyn TableBackend,
    appended: &AppendedRange,
    schema: &Schema,
    config: &LedgerConfig,
) -> Option<FormattingWarning> {
    let column = link::find_link_column(schema.columns(), &config.link_fields.aliases)?;
    let cell = appended.cell(appended.first_column + column);
    let style = link::link_style(&config.link_fields);
    match backend.format_cell(cell, &style).await {
        Ok(()) => None,
        Err(err) => {
            let warning = FormattingWarning {
                cell: cell.to_a1(backend.sheet_name()),
                message: err.reason().to_string(),
            };
            warn!(cell = %warning.cell, error = %warning.message, "link styling failed");
            Some(warning)
        }
    }
}

/// Appends `record` as one row aligned to the header.
pub async fn append_record(
    backend: &dyn TableBackend,
    config: &LedgerConfig,
    record: &Record,
) -> LedgerResult<AppendOutcome> {
    if record.is_empty() {
        return Err(LedgerError::invalid_input(EMPTY_OR_INVALID_INPUT));
    }

    let (schema, bootstrapped, dropped_fields) = resolve_schema(backend, record, config).await?;

    let values = project(record, &schema);
    if all_blank(&values) {
        return Err(LedgerError::invalid_input(BLANK_ROW_REFUSED));
    }
    let values = apply_link_formulas(values, &schema, config);
    debug!(columns = values.len(), "projected record onto header");

    let appended = match backend.append_row(&values, ValueInput::UserEntered).await {
        Ok(range) => range,
        Err(err) if bootstrapped => {
            return Err(LedgerError::SchemaBootstrap(format!(
                "header row created but first row was not appended: {}",
                err.reason()
            )))
        }
        Err(err) => return Err(err),
    };
    info!(sheet = backend.sheet_name(), row = appended.row, "appended row");

    let warnings = style_link_cell(backend, &appended, &schema, config)
        .await
        .into_iter()
        .collect();

    Ok(AppendOutcome {
        row: appended.row,
        bootstrapped,
        dropped_fields,
        warnings,
    })
}
