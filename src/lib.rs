#![warn(warnings)]
#![deny(clippy::all)]

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyDict, PyFloat, PyInt, PyList, PyString, PyTuple};
use pyo3::IntoPyObjectExt;
use serde_json::{Map, Number, Value};

pub mod config;
pub mod date;
pub mod document;
pub mod error;
pub mod ledger;
pub mod link;
pub mod lister;
pub mod logging;
pub mod policy;
pub mod record;
pub mod schema;
pub mod sheet;
pub mod storage;
pub mod writer;

use config::LedgerConfig;
use error::LedgerError;
use ledger::Ledger;
use record::Record;
use writer::AppendReport;

// --- Helpers ---

fn to_py_err(err: LedgerError) -> PyErr {
    match err {
        LedgerError::InvalidInput(_) | LedgerError::Config(_) => {
            PyValueError::new_err(err.to_string())
        }
        other => PyRuntimeError::new_err(other.to_string()),
    }
}

fn get_ledger(_py: Python<'_>, config: &Bound<'_, PyDict>) -> PyResult<Ledger> {
    let value = py_to_json(config.as_any())?;
    let config =
        LedgerConfig::from_value(value).map_err(|e| PyValueError::new_err(format!("{:#}", e)))?;
    Ledger::from_config(config).map_err(to_py_err)
}

fn py_to_json(obj: &Bound<'_, PyAny>) -> PyResult<Value> {
    if obj.is_none() {
        return Ok(Value::Null);
    }
    // bool before int: Python bools are ints.
    if obj.is_instance_of::<PyBool>() {
        return Ok(Value::Bool(obj.extract::<bool>()?));
    }
    if obj.is_instance_of::<PyInt>() {
        return Ok(Value::Number(Number::from(obj.extract::<i64>()?)));
    }
    if obj.is_instance_of::<PyFloat>() {
        let f = obj.extract::<f64>()?;
        return Number::from_f64(f)
            .map(Value::Number)
            .ok_or_else(|| PyValueError::new_err("NaN and infinity are not supported"));
    }
    if obj.is_instance_of::<PyString>() {
        return Ok(Value::String(obj.extract::<String>()?));
    }
    if let Ok(list) = obj.downcast::<PyList>() {
        let mut items = Vec::with_capacity(list.len());
        for item in list.iter() {
            items.push(py_to_json(&item)?);
        }
        return Ok(Value::Array(items));
    }
    if let Ok(tuple) = obj.downcast::<PyTuple>() {
        let mut items = Vec::with_capacity(tuple.len());
        for item in tuple.iter() {
            items.push(py_to_json(&item)?);
        }
        return Ok(Value::Array(items));
    }
    if let Ok(dict) = obj.downcast::<PyDict>() {
        let mut map = Map::new();
        for (k, v) in dict.iter() {
            let key = k
                .extract::<String>()
                .map_err(|_| PyValueError::new_err("dictionary keys must be strings"))?;
            map.insert(key, py_to_json(&v)?);
        }
        return Ok(Value::Object(map));
    }
    Err(PyValueError::new_err(format!(
        "unsupported value of type {}",
        obj.get_type().name()?
    )))
}

fn json_to_py(py: Python<'_>, value: Value) -> PyResult<PyObject> {
    match value {
        Value::Null => Ok(py.None()),
        Value::Bool(b) => b.into_py_any(py),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.into_py_any(py)
            } else if let Some(f) = n.as_f64() {
                f.into_py_any(py)
            } else {
                n.to_string().into_py_any(py)
            }
        }
        Value::String(s) => s.into_py_any(py),
        Value::Array(arr) => {
            let list = PyList::empty(py);
            for item in arr {
                list.append(json_to_py(py, item)?)?;
            }
            Ok(list.into())
        }
        Value::Object(map) => {
            let dict = PyDict::new(py);
            for (k, v) in map {
                dict.set_item(k, json_to_py(py, v)?)?;
            }
            Ok(dict.into())
        }
    }
}

fn serialize<T: serde::Serialize>(value: &T) -> PyResult<Value> {
    serde_json::to_value(value).map_err(|e| PyRuntimeError::new_err(e.to_string()))
}

// --- Bindings ---

// Schema and records

#[pyfunction]
fn ensure_schema<'a>(
    py: Python<'a>,
    storage_config: Bound<'a, PyDict>,
    columns: Vec<String>,
) -> PyResult<Bound<'a, PyAny>> {
    let ledger = get_ledger(py, &storage_config)?;
    pyo3_async_runtimes::tokio::future_into_py(py, async move {
        let state = ledger.ensure_schema(columns).await.map_err(to_py_err)?;
        Ok(state.into_schema().into_columns())
    })
}

#[pyfunction]
fn append_record<'a>(
    py: Python<'a>,
    storage_config: Bound<'a, PyDict>,
    record: Bound<'a, PyAny>,
) -> PyResult<Bound<'a, PyAny>> {
    let ledger = get_ledger(py, &storage_config)?;
    let parsed = py_to_json(&record).and_then(|value| {
        Record::from_value(value).map_err(|e| PyValueError::new_err(e.to_string()))
    });
    pyo3_async_runtimes::tokio::future_into_py(py, async move {
        let result = match parsed {
            Ok(record) => ledger.append(&record).await,
            Err(_) => Err(LedgerError::invalid_input(error::EMPTY_OR_INVALID_INPUT)),
        };
        let val = serialize(&AppendReport::from(&result))?;
        Python::with_gil(|py| json_to_py(py, val))
    })
}

#[pyfunction]
#[pyo3(signature = (storage_config, sorted=true))]
fn list_records<'a>(
    py: Python<'a>,
    storage_config: Bound<'a, PyDict>,
    sorted: bool,
) -> PyResult<Bound<'a, PyAny>> {
    let ledger = get_ledger(py, &storage_config)?;
    pyo3_async_runtimes::tokio::future_into_py(py, async move {
        let records = if sorted {
            ledger.list_sorted().await
        } else {
            ledger.list_records().await
        }
        .map_err(to_py_err)?;
        let val = serialize(&records)?;
        Python::with_gil(|py| json_to_py(py, val))
    })
}

// Policies

#[pyfunction]
fn submit_policy<'a>(
    py: Python<'a>,
    storage_config: Bound<'a, PyDict>,
    body: Bound<'a, PyAny>,
) -> PyResult<Bound<'a, PyAny>> {
    let ledger = get_ledger(py, &storage_config)?;
    let body = py_to_json(&body)?;
    pyo3_async_runtimes::tokio::future_into_py(py, async move {
        let response = policy::submit_policy(&ledger, body).await;
        let val = serialize(&response)?;
        Python::with_gil(|py| json_to_py(py, val))
    })
}

#[pyfunction]
fn list_policies<'a>(
    py: Python<'a>,
    storage_config: Bound<'a, PyDict>,
) -> PyResult<Bound<'a, PyAny>> {
    let ledger = get_ledger(py, &storage_config)?;
    pyo3_async_runtimes::tokio::future_into_py(py, async move {
        let policies = policy::list_policies(&ledger).await.map_err(to_py_err)?;
        let val = serialize(&policies)?;
        Python::with_gil(|py| json_to_py(py, val))
    })
}

// Documents

#[pyfunction]
fn upload_document<'a>(
    py: Python<'a>,
    storage_config: Bound<'a, PyDict>,
    content: Vec<u8>,
    content_type: String,
    name: String,
) -> PyResult<Bound<'a, PyAny>> {
    let ledger = get_ledger(py, &storage_config)?;
    pyo3_async_runtimes::tokio::future_into_py(py, async move {
        let uploaded = ledger
            .upload_document(&content, &content_type, &name)
            .await
            .map_err(to_py_err)?;
        let val = serialize(&uploaded)?;
        Python::with_gil(|py| json_to_py(py, val))
    })
}

#[pyfunction]
fn list_documents<'a>(
    py: Python<'a>,
    storage_config: Bound<'a, PyDict>,
) -> PyResult<Bound<'a, PyAny>> {
    let ledger = get_ledger(py, &storage_config)?;
    pyo3_async_runtimes::tokio::future_into_py(py, async move {
        let documents = ledger.list_documents().await.map_err(to_py_err)?;
        Ok(documents)
    })
}

// Process

#[pyfunction]
#[pyo3(signature = (filter=None, storage_config=None))]
fn init_logging(filter: Option<String>, storage_config: Option<Bound<'_, PyDict>>) -> PyResult<bool> {
    if filter.is_some() {
        return Ok(logging::init_logging(filter.as_deref()));
    }
    let config = match storage_config {
        Some(dict) => LedgerConfig::from_value(py_to_json(dict.as_any())?)
            .map_err(|e| PyValueError::new_err(format!("{:#}", e)))?,
        None => LedgerConfig::default(),
    };
    Ok(logging::init_from_config(&config))
}

#[pyfunction]
#[pyo3(name = "test_storage_connection")]
fn test_storage_connection_py<'a>(
    py: Python<'a>,
    storage_config: Bound<'a, PyDict>,
) -> PyResult<Bound<'a, PyAny>> {
    let ledger = get_ledger(py, &storage_config)?;
    pyo3_async_runtimes::tokio::future_into_py(py, async move {
        schema::read_schema(ledger.backend())
            .await
            .map_err(to_py_err)?;
        Ok(true)
    })
}

/// A Python module implemented in Rust.
#[pymodule]
fn _policy_ledger_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(ensure_schema, m)?)?;
    m.add_function(wrap_pyfunction!(append_record, m)?)?;
    m.add_function(wrap_pyfunction!(list_records, m)?)?;

    m.add_function(wrap_pyfunction!(submit_policy, m)?)?;
    m.add_function(wrap_pyfunction!(list_policies, m)?)?;

    m.add_function(wrap_pyfunction!(upload_document, m)?)?;
    m.add_function(wrap_pyfunction!(list_documents, m)?)?;

    m.add_function(wrap_pyfunction!(init_logging, m)?)?;
    m.add_function(wrap_pyfunction!(test_storage_connection_py, m)?)?;

    Ok(())
}
