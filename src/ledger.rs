use crate::config::LedgerConfig;
use crate::document::{self, UploadedDocument};
use crate::error::{LedgerError, LedgerResult};
use crate::lister;
use crate::record::Record;
use crate::schema::{self, SchemaState};
use crate::sheet::{OpendalTable, SheetsApiTable, StaticToken, TableBackend};
use crate::storage;
use crate::writer::{self, AppendOutcome};
use opendal::Operator;
use std::sync::Arc;

/// Handle bundling the backing table, the document store and configuration.
/// Constructed explicitly and passed to callers; it caches no table state.
#[derive(Clone)]
pub struct Ledger {
    backend: Arc<dyn TableBackend>,
    documents: Operator,
    config: LedgerConfig,
}

impl Ledger {
    pub fn new(backend: Arc<dyn TableBackend>, documents: Operator, config: LedgerConfig) -> Self {
        Self {
            backend,
            documents,
            config,
        }
    }

    /// Builds the backend named by `config`: the Sheets API when
    /// `sheets_api` is set, otherwise an opendal table at `storage_uri`.
    pub fn from_config(config: LedgerConfig) -> LedgerResult<Self> {
        config
            .validate()
            .map_err(|e| LedgerError::Config(e.to_string()))?;
        let op = storage::operator_from_uri(&config.storage_uri)
            .map_err(|e| LedgerError::Config(format!("{:#}", e)))?;

        let backend: Arc<dyn TableBackend> = match &config.sheets_api {
            Some(api) => {
                let token = api.resolve_token()?;
                Arc::new(SheetsApiTable::new(
                    api,
                    &config.sheet_name,
                    config.sheet_id,
                    Arc::new(StaticToken::new(token)),
                )?)
            }
            None => Arc::new(OpendalTable::new(op.clone(), "", &config.sheet_name)),
        };

        Ok(Self::new(backend, op, config))
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn backend(&self) -> &dyn TableBackend {
        self.backend.as_ref()
    }

    pub fn documents(&self) -> &Operator {
        &self.documents
    }

    pub async fn ensure_schema(&self, candidate: Vec<String>) -> LedgerResult<SchemaState> {
        schema::ensure_schema(self.backend(), candidate).await
    }

    pub async fn append(&self, record: &Record) -> LedgerResult<AppendOutcome> {
        writer::append_record(self.backend(), &self.config, record).await
    }

    pub async fn list_records(&self) -> LedgerResult<Vec<Record>> {
        lister::list_records(self.backend(), &self.config).await
    }

    pub async fn list_sorted(&self) -> LedgerResult<Vec<Record>> {
        lister::list_sorted(self.backend(), &self.config).await
    }

    pub async fn upload_document(
        &self,
        content: &[u8],
        content_type: &str,
        name: &str,
    ) -> LedgerResult<UploadedDocument> {
        document::upload_document(
            &self.documents,
            &self.config.documents,
            content,
            content_type,
            name,
        )
        .await
    }

    pub async fn list_documents(&self) -> LedgerResult<Vec<String>> {
        document::list_documents(&self.documents, &self.config.documents).await
    }

    pub async fn delete_document(&self, path: &str) -> LedgerResult<()> {
        document::delete_document(&self.documents, &self.config.documents, path).await
    }
}
