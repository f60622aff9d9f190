use crate::config::DocumentConfig;
use crate::error::{LedgerError, LedgerResult};
use futures::TryStreamExt;
use opendal::{EntryMode, ErrorKind, Operator};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;
use url::Url;
use uuid::Uuid;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UploadedDocument {
    pub id: String,
    pub name: String,
    pub path: String,
    pub public_url: String,
    pub sha256: String,
}

fn validate_name(name: &str) -> LedgerResult<&str> {
    let name = name.trim();
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.chars().any(char::is_control)
    {
        return Err(LedgerError::invalid_input(format!(
            "invalid document name '{}'",
            name
        )));
    }
    Ok(name)
}

fn folder_path(config: &DocumentConfig) -> String {
    format!("{}/", config.folder.trim_matches('/'))
}

/// Public URL of a stored document, one path segment per component.
pub fn public_url(config: &DocumentConfig, path: &str) -> LedgerResult<String> {
    let mut url = Url::parse(&config.public_base_url).map_err(|e| {
        LedgerError::Config(format!(
            "invalid public_base_url '{}': {}",
            config.public_base_url, e
        ))
    })?;
    url.path_segments_mut()
        .map_err(|_| LedgerError::Config("public_base_url cannot be a base".to_string()))?
        .pop_if_empty()
        .extend(path.split('/').filter(|s| !s.is_empty()));
    Ok(url.to_string())
}

/// Stores a PDF and returns where it can be fetched publicly.
pub async fn upload_document(
    op: &Operator,
    config: &DocumentConfig,
    content: &[u8],
    content_type: &str,
    name: &str,
) -> LedgerResult<UploadedDocument> {
    let essence = content_type.split(';').next().unwrap_or("").trim();
    if !essence.eq_ignore_ascii_case(PDF_CONTENT_TYPE) {
        return Err(LedgerError::invalid_input("only PDF files are allowed"));
    }
    if content.is_empty() {
        return Err(LedgerError::invalid_input("no file provided"));
    }
    let name = validate_name(name)?;

    let id = Uuid::new_v4().simple().to_string();
    let path = format!("{}{}-{}", folder_path(config), id, name);
    op.write_with(&path, content.to_vec())
        .content_type(PDF_CONTENT_TYPE)
        .await?;

    let sha256 = hex::encode(Sha256::digest(content));
    let public_url = public_url(config, &path)?;
    info!(path = %path, bytes = content.len(), "stored document");

    Ok(UploadedDocument {
        id,
        name: name.to_string(),
        path,
        public_url,
        sha256,
    })
}

/// Stored document paths, relative to the operator root.
pub async fn list_documents(op: &Operator, config: &DocumentConfig) -> LedgerResult<Vec<String>> {
    let folder = folder_path(config);
    let mut lister = match op.lister(&folder).await {
        Ok(lister) => lister,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
        Err(e) => return Err(e.into()),
    };
    let mut documents = Vec::new();

    while let Some(entry) = lister.try_next().await? {
        if entry.metadata().mode() != EntryMode::FILE {
            continue;
        }
        let name = entry.name().split('/').next_back().unwrap_or("");
        if !name.is_empty() {
            documents.push(format!("{}{}", folder, name));
        }
    }

    documents.sort();
    Ok(documents)
}

pub async fn delete_document(op: &Operator, config: &DocumentConfig, path: &str) -> LedgerResult<()> {
    if !path.starts_with(&folder_path(config)) || path.contains("..") {
        return Err(LedgerError::invalid_input(format!(
            "'{}' is not a stored document",
            path
        )));
    }
    op.delete(path).await?;
    Ok(())
}
