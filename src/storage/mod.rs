mod opendal;

pub use self::opendal::create_operator_from_uri;

use ::opendal::Operator;
use anyhow::Result;
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

static MEMORY_OPERATORS: OnceLock<Mutex<HashMap<String, Operator>>> = OnceLock::new();

fn memory_cache() -> &'static Mutex<HashMap<String, Operator>> {
    MEMORY_OPERATORS.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Returns an operator for `uri`. In-memory operators are shared per URI so
/// data written by one call is visible to the next.
pub fn operator_from_uri(uri: &str) -> Result<Operator> {
    if uri.starts_with("memory://") {
        let mut cache = memory_cache()
            .lock()
            .map_err(|_| anyhow::anyhow!("memory operator cache lock poisoned"))?;
        if let Some(op) = cache.get(uri) {
            return Ok(op.clone());
        }
        let op = create_operator_from_uri(uri)?;
        cache.insert(uri.to_string(), op.clone());
        return Ok(op);
    }

    create_operator_from_uri(uri)
}
