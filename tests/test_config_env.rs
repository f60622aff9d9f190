use _policy_ledger_core::config::{LedgerConfig, SHEET_NAME_ENV, STORAGE_URI_ENV};
use serde_json::json;

// Environment variables are process-wide, so every override case runs in
// this one test binary and one test.
#[test]
fn test_config_env_overrides_apply_to_value_and_file() -> anyhow::Result<()> {
    std::env::set_var(STORAGE_URI_ENV, "memory://env-override");
    std::env::set_var(SHEET_NAME_ENV, "FromEnv");

    let config = LedgerConfig::from_value(json!({
        "storage_uri": "memory://from-value",
        "sheet_name": "Sheet1"
    }))?;
    assert_eq!(config.storage_uri, "memory://env-override");
    assert_eq!(config.sheet_name, "FromEnv");

    let path = std::env::temp_dir().join(format!("ledger-env-{}.yaml", uuid::Uuid::new_v4()));
    std::fs::write(&path, "sheet_name: FromFile\n")?;
    let from_file = LedgerConfig::from_file(&path);
    std::fs::remove_file(&path)?;
    let from_file = from_file?;
    assert_eq!(from_file.storage_uri, "memory://env-override");
    assert_eq!(from_file.sheet_name, "FromEnv");

    std::env::set_var(SHEET_NAME_ENV, "");
    std::env::remove_var(STORAGE_URI_ENV);
    let config = LedgerConfig::from_value(json!({"sheet_name": "Kept"}))?;
    assert_eq!(config.sheet_name, "Kept");
    assert_eq!(config.storage_uri, "memory://");

    std::env::remove_var(SHEET_NAME_ENV);
    Ok(())
}
