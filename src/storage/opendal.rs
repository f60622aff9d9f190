use anyhow::{anyhow, Context, Result};
use opendal::{Operator, Scheme};
use std::collections::HashMap;
use std::str::FromStr;
use url::Url;

/// Creates an OpenDAL Operator from a URI string.
///
/// Supported schemes:
/// - memory:// -> in-memory, one fresh store per call
/// - file:///path/to/dir -> local filesystem rooted at the path
/// - s3://bucket/root -> AWS S3 (credentials from the environment)
/// - gcs://bucket/root -> Google Cloud Storage
pub fn create_operator_from_uri(uri: &str) -> Result<Operator> {
    if uri.starts_with("memory://") {
        let builder = opendal::services::Memory::default();
        let op = Operator::new(builder)?.finish();
        return Ok(op);
    }

    let url = Url::parse(uri).with_context(|| format!("Invalid storage URI: {}", uri))?;
    let scheme_str = match url.scheme() {
        "file" => "fs",
        other => other,
    };

    let scheme = Scheme::from_str(scheme_str)
        .map_err(|_| anyhow!("Unsupported storage scheme: {}", scheme_str))?;

    let mut map = HashMap::new();
    let root = url.path();

    match scheme {
        Scheme::Fs => {
            map.insert("root".to_string(), root.to_string());
        }
        Scheme::S3 | Scheme::Gcs => {
            let bucket = url
                .host_str()
                .ok_or_else(|| anyhow!("{} URI missing bucket", scheme))?;
            map.insert("bucket".to_string(), bucket.to_string());
            if !root.is_empty() && root != "/" {
                map.insert("root".to_string(), root.to_string());
            }
            if scheme == Scheme::S3 {
                map.insert("region".to_string(), "auto".to_string());
            }
        }
        _ => {
            return Err(anyhow!("Storage scheme {} is not supported", scheme));
        }
    }

    let op = Operator::via_iter(scheme, map)?;
    Ok(op)
}
