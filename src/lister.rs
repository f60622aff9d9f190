use crate::config::LedgerConfig;
use crate::date;
use crate::error::{LedgerError, LedgerResult};
use crate::link;
use crate::record::{CellValue, Record};
use crate::sheet::{RowRange, TableBackend, ValueRender};
use chrono::NaiveDateTime;
use std::cmp::Ordering;
use tracing::debug;

/// All data rows keyed by the header row, in storage order.
pub async fn list_records(
    backend: &dyn TableBackend,
    config: &LedgerConfig,
) -> LedgerResult<Vec<Record>> {
    let grid = backend
        .read_rows(RowRange::from_row(1), ValueRender::Formula)
        .await
        .map_err(|e| LedgerError::Transport(e.reason().to_string()))?;
    let mut rows = grid.into_iter();
    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };
    let header: Vec<String> = header.iter().map(|h| h.trim().to_string()).collect();
    let aliases = &config.link_fields.aliases;

    let records = rows
        .map(|row| {
            let mut record = Record::new();
            for (idx, column) in header.iter().enumerate() {
                if column.is_empty() {
                    continue;
                }
                let raw = row.get(idx).cloned().unwrap_or_default();
                let value = if link::is_link_column(column, aliases) {
                    link::parse_hyperlink(&raw).map(|l| l.url).unwrap_or(raw)
                } else {
                    raw
                };
                record.insert(column.clone(), CellValue::Text(value));
            }
            record
        })
        .collect();
    Ok(records)
}

/// First key of the first record whose lower-cased name contains one of
/// `aliases`.
pub fn detect_date_column(records: &[Record], aliases: &[String]) -> Option<String> {
    let first = records.first()?;
    first
        .keys()
        .find(|key| {
            let lowered = key.to_lowercase();
            aliases
                .iter()
                .any(|alias| lowered.contains(&alias.to_lowercase()))
        })
        .map(str::to_string)
}

/// Most recent first; records without a parseable date go after all dated
/// ones. Equal keys keep storage order.
pub fn compare_dates(a: Option<&NaiveDateTime>, b: Option<&NaiveDateTime>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => b.cmp(a),
    }
}

/// Sorts in place by `column`, descending by parsed date. Stable.
pub fn sort_by_date(records: &mut [Record], column: &str) {
    let mut keyed: Vec<(Option<NaiveDateTime>, Record)> = records
        .iter()
        .map(|r| {
            let parsed = r.text(column).and_then(|text| date::parse_date(&text));
            (parsed, r.clone())
        })
        .collect();
    keyed.sort_by(|(a, _), (b, _)| compare_dates(a.as_ref(), b.as_ref()));
    for (slot, (_, record)) in records.iter_mut().zip(keyed) {
        *slot = record;
    }
}

/// Applies the date heuristic to already retrieved records.
pub fn sort_records(mut records: Vec<Record>, aliases: &[String]) -> Vec<Record> {
    match detect_date_column(&records, aliases) {
        Some(column) => {
            debug!(column = %column, "sorting by date column");
            sort_by_date(&mut records, &column);
        }
        None => debug!("no date column found, keeping storage order"),
    }
    records
}

pub async fn list_sorted(
    backend: &dyn TableBackend,
    config: &LedgerConfig,
) -> LedgerResult<Vec<Record>> {
    let records = list_records(backend, config).await?;
    Ok(sort_records(records, &config.date_columns))
}
