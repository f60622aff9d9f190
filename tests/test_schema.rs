mod common;
use _policy_ledger_core::error::LedgerError;
use _policy_ledger_core::schema::{self, Schema, SchemaState};
use _policy_ledger_core::sheet::{RowRange, TableBackend, ValueInput, ValueRender};
use common::{grid, setup_table, FaultyBackend};
use std::sync::atomic::Ordering;

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_schema_bootstraps_empty_table_with_candidate_order() -> anyhow::Result<()> {
    let table = setup_table()?;

    let state = schema::ensure_schema(&table, columns(&["Policy No", "Insured Name", "A"])).await?;
    assert!(state.is_bootstrapped());
    assert_eq!(
        state.schema().columns(),
        &columns(&["Policy No", "Insured Name", "A"])[..]
    );

    let header = table
        .read_rows(RowRange::single(1), ValueRender::FormattedValue)
        .await?;
    assert_eq!(header, grid(&[&["Policy No", "Insured Name", "A"]]));

    Ok(())
}

#[tokio::test]
async fn test_schema_existing_header_is_trimmed_and_candidate_ignored() -> anyhow::Result<()> {
    let table = setup_table()?;
    table
        .write_rows(
            RowRange::single(1),
            &grid(&[&["  Policy No ", "Expiry Date  "]]),
            ValueInput::Raw,
        )
        .await?;

    let state = schema::ensure_schema(&table, columns(&["Other", "Keys"])).await?;
    assert_eq!(
        state,
        SchemaState::Existing(Schema::new(columns(&["Policy No", "Expiry Date"])))
    );

    Ok(())
}

#[tokio::test]
async fn test_schema_ensure_twice_never_rewrites_header() -> anyhow::Result<()> {
    let backend = FaultyBackend::new(setup_table()?);

    schema::ensure_schema(&backend, columns(&["A", "B"])).await?;
    assert_eq!(backend.writes.load(Ordering::SeqCst), 1);

    let again = schema::ensure_schema(&backend, columns(&["B", "A", "C"])).await?;
    assert!(!again.is_bootstrapped());
    assert_eq!(again.schema().columns(), &columns(&["A", "B"])[..]);
    assert_eq!(backend.writes.load(Ordering::SeqCst), 1);

    Ok(())
}

#[tokio::test]
async fn test_schema_read_failure_is_schema_unavailable() -> anyhow::Result<()> {
    let backend = FaultyBackend::new(setup_table()?);
    backend.fail_reads.store(true, Ordering::SeqCst);

    let err = schema::ensure_schema(&backend, columns(&["A"]))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::SchemaUnavailable(_)));
    assert_eq!(backend.mutations(), 0);

    Ok(())
}

#[tokio::test]
async fn test_schema_header_write_failure_is_bootstrap_error() -> anyhow::Result<()> {
    let backend = FaultyBackend::new(setup_table()?);
    backend.fail_writes.store(true, Ordering::SeqCst);

    let err = schema::ensure_schema(&backend, columns(&["A"]))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::SchemaBootstrap(_)));
    assert!(schema::read_schema(&backend).await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_schema_extend_appends_only_new_columns() -> anyhow::Result<()> {
    let table = setup_table()?;
    let state = schema::ensure_schema(&table, columns(&["A", "B"])).await?;

    let extended =
        schema::extend_schema(&table, state.schema(), &columns(&["B", "C", "D"])).await?;
    assert_eq!(extended.columns(), &columns(&["A", "B", "C", "D"])[..]);

    let reread = schema::read_schema(&table).await?.unwrap();
    assert_eq!(reread, extended);

    Ok(())
}
