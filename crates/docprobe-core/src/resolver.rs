//! Follow a record id to its stored file: record → linked document → payload.
//!
//! The resolver depends only on the `DataService` and `ObjectStore` traits;
//! both are injected at construction. Every failure is folded into the
//! returned `Report`; nothing is returned as an error.

use crate::cancel::CancelToken;
use crate::checksum;
use crate::data_service::DataService;
use crate::model::{Payload, RecordId};
use crate::object_store::ObjectStore;
use crate::report::{LinkageGap, Outcome, Report, ServiceErrorDetail};

/// Report plus the fetched payload, for callers that pass the bytes onward.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub report: Report,
    /// Present only when `report` is a success.
    pub payload: Option<Payload>,
}

pub struct Resolver<D, S> {
    data: D,
    store: S,
}

impl<D, S> Resolver<D, S>
where
    D: DataService,
    S: ObjectStore,
{
    pub fn new(data: D, store: S) -> Self {
        Self { data, store }
    }

    /// Resolve `id` and report each stage. At most two outbound calls; the
    /// object store is only called once a usable storage path is known.
    pub fn resolve(&self, id: &RecordId, cancel: &CancelToken) -> Report {
        self.resolve_keep(id, cancel).report
    }

    /// Like `resolve`, but hands back the payload bytes on success.
    pub fn resolve_keep(&self, id: &RecordId, cancel: &CancelToken) -> Resolution {
        tracing::info!(record_id = %id, "fetching record");
        let record = match self.data.fetch_record(id, cancel) {
            Ok(Some(record)) => record,
            Ok(None) => {
                tracing::warn!(record_id = %id, "record not found");
                return finished(Report::new(id.clone(), Outcome::NotFound));
            }
            Err(e) => {
                tracing::warn!(record_id = %id, "data service error: {}", e);
                let error = ServiceErrorDetail::from(&e);
                return finished(Report::new(id.clone(), Outcome::DataServiceError { error }));
            }
        };

        let mut report = Report::new(id.clone(), Outcome::NotFound);
        report.record_status = record.status;
        report.linked_document_count = record.linked_documents.len();

        // Only the first document is followed, in the order the service returned them.
        let Some(document) = record.linked_documents.into_iter().next() else {
            tracing::warn!(record_id = %id, "record has no linked documents");
            report.outcome = Outcome::MissingLinkage {
                gap: LinkageGap::NoLinkedDocuments,
            };
            return finished(report);
        };
        if report.linked_document_count > 1 {
            tracing::debug!(
                record_id = %id,
                "{} linked documents, using the first",
                report.linked_document_count
            );
        }

        let storage_path = document.usable_storage_path().map(str::to_string);
        report.document = Some(document);
        let Some(storage_path) = storage_path else {
            tracing::warn!(record_id = %id, "linked document has no storage path");
            report.outcome = Outcome::MissingLinkage {
                gap: LinkageGap::MissingStoragePath,
            };
            return finished(report);
        };

        tracing::info!(record_id = %id, storage_path = %storage_path, "fetching payload");
        match self.store.fetch(&storage_path, cancel) {
            Ok(payload) => {
                tracing::info!(
                    record_id = %id,
                    storage_path = %storage_path,
                    "payload fetched: {} bytes, {}",
                    payload.size,
                    payload.content_type
                );
                report.outcome = Outcome::Success {
                    size: payload.size,
                    content_type: payload.content_type.clone(),
                    sha256: checksum::sha256_hex(&payload.bytes),
                };
                Resolution {
                    report,
                    payload: Some(payload),
                }
            }
            Err(e) => {
                tracing::warn!(
                    record_id = %id,
                    storage_path = %storage_path,
                    "storage fetch failed: {}",
                    e
                );
                report.outcome = Outcome::StorageFetchError {
                    error: ServiceErrorDetail::from(&e),
                    storage_path,
                };
                finished(report)
            }
        }
    }
}

fn finished(report: Report) -> Resolution {
    Resolution {
        report,
        payload: None,
    }
}
