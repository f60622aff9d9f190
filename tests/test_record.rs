use _policy_ledger_core::error::{LedgerError, EMPTY_OR_INVALID_INPUT};
use _policy_ledger_core::record::{CellValue, Record};
use serde_json::json;

#[test]
fn test_record_preserves_key_order() -> anyhow::Result<()> {
    let record = Record::from_json(r#"{"Zeta": "1", "Alpha": "2", "Mid": "3"}"#)?;
    assert_eq!(record.keys().collect::<Vec<_>>(), vec!["Zeta", "Alpha", "Mid"]);
    Ok(())
}

#[test]
fn test_record_rejects_non_objects_and_nested_values() {
    for bad in ["[1, 2]", "\"text\"", "null", "{not json"] {
        let err = Record::from_json(bad).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidInput(ref r) if r == EMPTY_OR_INVALID_INPUT));
    }
    let nested = Record::from_value(json!({"a": {"b": 1}})).unwrap_err();
    assert!(matches!(nested, LedgerError::InvalidInput(ref r) if r.contains("'a'")));
}

#[test]
fn test_record_cell_text_per_kind() -> anyhow::Result<()> {
    let record = Record::from_value(json!({
        "s": "x",
        "n": 42,
        "f": 1.5,
        "t": true,
        "z": null
    }))?;
    assert_eq!(record.text("s").as_deref(), Some("x"));
    assert_eq!(record.text("n").as_deref(), Some("42"));
    assert_eq!(record.text("f").as_deref(), Some("1.5"));
    assert_eq!(record.text("t").as_deref(), Some("TRUE"));
    assert_eq!(record.text("z").as_deref(), Some(""));
    assert_eq!(record.text("missing"), None);
    assert!(record.get("z").is_some_and(CellValue::is_blank));
    Ok(())
}

#[test]
fn test_record_serializes_back_to_same_object() -> anyhow::Result<()> {
    let value = json!({"B": "2", "A": 1, "C": false});
    let record = Record::from_value(value.clone())?;
    assert_eq!(record.to_value(), value);
    assert_eq!(serde_json::to_string(&record)?, r#"{"B":"2","A":1,"C":false}"#);
    Ok(())
}
