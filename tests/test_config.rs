use _policy_ledger_core::config::{LedgerConfig, UnknownFieldPolicy};
use _policy_ledger_core::error::LedgerError;
use _policy_ledger_core::ledger::Ledger;
use _policy_ledger_core::logging;
use serde_json::json;

#[test]
fn test_config_defaults_match_policy_sheet() {
    let config = LedgerConfig::default();
    assert_eq!(config.sheet_name, "Sheet1");
    assert_eq!(config.link_fields.sentinel, "No PDF attached");
    assert_eq!(config.link_fields.label, "View PDF");
    assert_eq!(
        config.link_fields.aliases,
        vec!["PDF Link", "pdf_link", "PDF_Link"]
    );
    assert_eq!(config.unknown_fields, UnknownFieldPolicy::Drop);
    assert_eq!(config.date_columns[0], "date");
    assert!(config.sheets_api.is_none());
}

#[test]
fn test_config_from_yaml_fills_missing_fields() -> anyhow::Result<()> {
    let yaml = r#"
storage_uri: "memory://config-yaml"
sheet_name: Policies
unknown_fields: extend
link_fields:
  aliases: ["Document"]
documents:
  public_base_url: "https://files.example.com/pub"
"#;
    let config = LedgerConfig::from_yaml_str(yaml)?;
    assert_eq!(config.sheet_name, "Policies");
    assert_eq!(config.unknown_fields, UnknownFieldPolicy::Extend);
    assert_eq!(config.link_fields.aliases, vec!["Document"]);
    assert_eq!(config.link_fields.sentinel, "No PDF attached");
    assert_eq!(config.documents.folder, "Policy Data");
    Ok(())
}

#[test]
fn test_config_rejects_invalid_values() {
    assert!(LedgerConfig::from_yaml_str("sheet_name: \"\"").is_err());
    assert!(LedgerConfig::from_yaml_str("unknown_fields: merge").is_err());
    assert!(LedgerConfig::from_value(json!({"sheets_api": {"spreadsheet_id": ""}})).is_err());
}

#[test]
fn test_config_sheets_api_without_token_is_config_error() -> anyhow::Result<()> {
    let config = LedgerConfig::from_value(json!({
        "sheets_api": {
            "spreadsheet_id": "abc",
            "access_token_env": "POLICY_LEDGER_TEST_TOKEN_THAT_IS_NEVER_SET"
        }
    }))?;
    let err = Ledger::from_config(config).err().expect("missing token");
    assert!(matches!(err, LedgerError::Config(_)));
    Ok(())
}

#[tokio::test]
async fn test_config_memory_ledgers_share_data_per_uri() -> anyhow::Result<()> {
    let config = LedgerConfig::from_value(json!({"storage_uri": "memory://shared-config-test"}))?;
    let writer = Ledger::from_config(config.clone())?;
    let reader = Ledger::from_config(config)?;

    let record = [("A", "1")].into_iter().collect();
    writer.append(&record).await?;
    assert_eq!(reader.list_records().await?.len(), 1);
    Ok(())
}

#[test]
fn test_config_from_file_reads_yaml() -> anyhow::Result<()> {
    let path = std::env::temp_dir().join(format!("ledger-{}.yaml", uuid::Uuid::new_v4()));
    std::fs::write(
        &path,
        "sheet_name: Renewals\nlog_filter: \"policy_ledger_core=debug\"\n",
    )?;
    let config = LedgerConfig::from_file(&path);
    std::fs::remove_file(&path)?;
    let config = config?;
    assert_eq!(config.sheet_name, "Renewals");
    assert_eq!(config.storage_uri, "memory://");
    assert_eq!(config.log_filter.as_deref(), Some("policy_ledger_core=debug"));

    assert!(LedgerConfig::from_file(std::env::temp_dir().join("ledger-missing.yaml")).is_err());
    Ok(())
}

#[test]
fn test_logging_filter_follows_config() {
    let config = LedgerConfig::from_value(json!({"log_filter": "policy_ledger_core=debug"}))
        .expect("valid config");
    let filter = logging::env_filter(config.log_filter.as_deref()).to_string();
    assert!(filter.contains("policy_ledger_core=debug"), "{}", filter);

    assert!(logging::init_from_config(&config));
    assert!(!logging::init_logging(None));
}
