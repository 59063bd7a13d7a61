//! Relational data service: joined record reads and single-row table samples.

use crate::cancel::CancelToken;
use crate::config::ProbeConfig;
use crate::endpoint::Endpoint;
use crate::error::ServiceError;
use crate::model::{Record, RecordId};
use anyhow::Result;
use serde_json::{Map, Value};

/// Alias the documents relation is selected under, so rows always decode the same way.
const DOCUMENTS_ALIAS: &str = "linked_documents";
const DOCUMENT_COLUMNS: &str = "filename,storage_path,file_type";

/// Read access to records and tables. Implementations block until the call completes.
pub trait DataService {
    /// Fetch a record and its first-level linked documents in one read.
    /// `Ok(None)` when no row has this id.
    fn fetch_record(
        &self,
        id: &RecordId,
        cancel: &CancelToken,
    ) -> Result<Option<Record>, ServiceError>;

    /// Fetch at most one row of `table`. `Ok(None)` when the table is empty.
    fn sample_row(
        &self,
        table: &str,
        cancel: &CancelToken,
    ) -> Result<Option<Map<String, Value>>, ServiceError>;
}

/// PostgREST client (`/rest/v1`).
#[derive(Debug, Clone)]
pub struct RestDataService {
    endpoint: Endpoint,
    records_table: String,
    documents_relation: String,
}

impl RestDataService {
    pub fn new(endpoint: Endpoint, records_table: &str, documents_relation: &str) -> Self {
        Self {
            endpoint,
            records_table: records_table.trim().to_string(),
            documents_relation: documents_relation.trim().to_string(),
        }
    }

    pub fn from_config(cfg: &ProbeConfig) -> Result<Self> {
        Ok(Self::new(
            Endpoint::from_config(cfg)?,
            &cfg.data.records_table,
            &cfg.data.documents_relation,
        ))
    }

    fn record_select(&self) -> String {
        format!(
            "id,status,{DOCUMENTS_ALIAS}:{}({DOCUMENT_COLUMNS})",
            self.documents_relation
        )
    }

    fn first_row<T>(&self, body: &[u8]) -> Result<Option<T>, ServiceError>
    where
        T: serde::de::DeserializeOwned,
    {
        let rows: Vec<T> = serde_json::from_slice(body)?;
        Ok(rows.into_iter().next())
    }
}

impl DataService for RestDataService {
    fn fetch_record(
        &self,
        id: &RecordId,
        cancel: &CancelToken,
    ) -> Result<Option<Record>, ServiceError> {
        let mut url = self.endpoint.url(["rest", "v1", self.records_table.as_str()]);
        url.query_pairs_mut()
            .append_pair("select", &self.record_select())
            .append_pair("id", &format!("eq.{id}"))
            .append_pair("limit", "1");
        let resp = self.endpoint.get(&url, Some("application/json"), cancel)?;
        self.first_row(&resp.body)
    }

    fn sample_row(
        &self,
        table: &str,
        cancel: &CancelToken,
    ) -> Result<Option<Map<String, Value>>, ServiceError> {
        let mut url = self.endpoint.url(["rest", "v1", table.trim()]);
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("limit", "1");
        let resp = self.endpoint.get(&url, Some("application/json"), cancel)?;
        self.first_row(&resp.body)
    }
}
