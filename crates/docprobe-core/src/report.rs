//! Resolution reports: one closed outcome per run, plus what was learned on the way.

use crate::error::{ErrorBody, ServiceError};
use crate::http::TransportError;
use crate::model::{LinkedDocument, RecordId};
use serde::Serialize;
use std::fmt;

/// Bare outcome tag, for callers that only branch on the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReportTag {
    Success,
    DataServiceError,
    NotFound,
    MissingLinkage,
    StorageFetchError,
}

impl fmt::Display for ReportTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReportTag::Success => "Success",
            ReportTag::DataServiceError => "DataServiceError",
            ReportTag::NotFound => "NotFound",
            ReportTag::MissingLinkage => "MissingLinkage",
            ReportTag::StorageFetchError => "StorageFetchError",
        };
        f.write_str(s)
    }
}

/// Why a found record could not be followed to a stored file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkageGap {
    NoLinkedDocuments,
    MissingStoragePath,
}

impl fmt::Display for LinkageGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkageGap::NoLinkedDocuments => write!(f, "record has no linked documents"),
            LinkageGap::MissingStoragePath => {
                write!(f, "first linked document has no storage path")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Timeout,
    Cancelled,
    Connection,
    /// The service answered with an error status.
    Http,
    /// The service answered 2xx with a body of the wrong shape.
    Decode,
    /// Request could not be built or failed in a way curl does not classify.
    Transport,
}

/// Underlying error of a failed call, kept verbatim for the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceErrorDetail {
    pub kind: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u32>,
    #[serde(flatten)]
    pub body: ErrorBody,
}

impl From<&ServiceError> for ServiceErrorDetail {
    fn from(e: &ServiceError) -> Self {
        let (kind, http_status, body) = match e {
            ServiceError::Status { status, body } => (ErrorKind::Http, Some(*status), body.clone()),
            ServiceError::Transport(t) => {
                let kind = match t {
                    TransportError::Cancelled => ErrorKind::Cancelled,
                    TransportError::Timeout(_) => ErrorKind::Timeout,
                    TransportError::Connection(_) => ErrorKind::Connection,
                    TransportError::Setup(_) | TransportError::Curl(_) => ErrorKind::Transport,
                };
                (kind, None, message_only(e))
            }
            ServiceError::Decode(_) => (ErrorKind::Decode, None, message_only(e)),
        };
        Self {
            kind,
            http_status,
            body,
        }
    }
}

fn message_only(e: &ServiceError) -> ErrorBody {
    ErrorBody {
        message: Some(e.to_string()),
        ..ErrorBody::default()
    }
}

impl fmt::Display for ServiceErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.http_status {
            Some(status) => write!(f, "HTTP {}: {}", status, self.body),
            None => write!(f, "{:?}: {}", self.kind, self.body),
        }
    }
}

/// Final state of one resolution. Exactly one per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "tag")]
pub enum Outcome {
    Success {
        size: u64,
        content_type: String,
        sha256: String,
    },
    DataServiceError {
        error: ServiceErrorDetail,
    },
    NotFound,
    MissingLinkage {
        gap: LinkageGap,
    },
    StorageFetchError {
        storage_path: String,
        error: ServiceErrorDetail,
    },
}

impl Outcome {
    pub fn tag(&self) -> ReportTag {
        match self {
            Outcome::Success { .. } => ReportTag::Success,
            Outcome::DataServiceError { .. } => ReportTag::DataServiceError,
            Outcome::NotFound => ReportTag::NotFound,
            Outcome::MissingLinkage { .. } => ReportTag::MissingLinkage,
            Outcome::StorageFetchError { .. } => ReportTag::StorageFetchError,
        }
    }
}

/// Human-readable (Display) and machine-readable (Serialize) result of `Resolver::resolve`.
/// Holds payload metadata only, never the bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub record_id: RecordId,
    /// Status of the record, when it was found.
    pub record_status: Option<String>,
    pub linked_document_count: usize,
    /// The linked document that was followed (always the first one).
    pub document: Option<LinkedDocument>,
    pub outcome: Outcome,
}

impl Report {
    pub fn new(record_id: RecordId, outcome: Outcome) -> Self {
        Self {
            record_id,
            record_status: None,
            linked_document_count: 0,
            document: None,
            outcome,
        }
    }

    pub fn tag(&self) -> ReportTag {
        self.outcome.tag()
    }

    pub fn is_success(&self) -> bool {
        self.tag() == ReportTag::Success
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<10} {}", "record", self.record_id)?;
        if !matches!(self.outcome, Outcome::NotFound | Outcome::DataServiceError { .. }) {
            writeln!(
                f,
                "{:<10} {}",
                "status",
                self.record_status.as_deref().unwrap_or("-")
            )?;
            writeln!(f, "{:<10} {}", "documents", self.linked_document_count)?;
        }
        if let Some(doc) = &self.document {
            writeln!(
                f,
                "{:<10} {} ({}) at {}",
                "document",
                doc.filename.as_deref().unwrap_or("-"),
                doc.file_type.as_deref().unwrap_or("-"),
                doc.storage_path.as_deref().unwrap_or("-")
            )?;
        }
        write!(f, "{:<10} {}", "result", self.tag())?;
        match &self.outcome {
            Outcome::Success {
                size,
                content_type,
                sha256,
            } => write!(f, ": {size} bytes, {content_type}, sha256 {sha256}"),
            Outcome::DataServiceError { error } => write!(f, ": {error}"),
            Outcome::NotFound => write!(f, ": no record with this id"),
            Outcome::MissingLinkage { gap } => write!(f, ": {gap}"),
            Outcome::StorageFetchError {
                storage_path,
                error,
            } => write!(f, ": {storage_path}: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::Cancelled;

    fn id() -> RecordId {
        RecordId::parse("rec-1").unwrap()
    }

    #[test]
    fn status_error_keeps_body() {
        let e = ServiceError::Status {
            status: 404,
            body: ErrorBody::parse(br#"{"error":"not_found","message":"Object not found"}"#),
        };
        let d = ServiceErrorDetail::from(&e);
        assert_eq!(d.kind, ErrorKind::Http);
        assert_eq!(d.http_status, Some(404));
        assert_eq!(d.body.code.as_deref(), Some("not_found"));
        assert_eq!(d.to_string(), "HTTP 404: [not_found] Object not found");
    }

    #[test]
    fn cancelled_transport_maps_to_cancelled_kind() {
        let e = ServiceError::from(TransportError::from(Cancelled));
        let d = ServiceErrorDetail::from(&e);
        assert_eq!(d.kind, ErrorKind::Cancelled);
        assert!(d.http_status.is_none());
        assert_eq!(d.body.message.as_deref(), Some("request cancelled"));
    }

    #[test]
    fn display_missing_linkage() {
        let mut r = Report::new(
            id(),
            Outcome::MissingLinkage {
                gap: LinkageGap::NoLinkedDocuments,
            },
        );
        r.record_status = Some("draft".into());
        let text = r.to_string();
        assert!(text.contains("rec-1"));
        assert!(text.contains("draft"));
        assert!(text.contains("MissingLinkage: record has no linked documents"));
    }

    #[test]
    fn display_not_found_omits_status() {
        let text = Report::new(id(), Outcome::NotFound).to_string();
        assert!(!text.contains("status"));
        assert!(text.ends_with("NotFound: no record with this id"));
    }

    #[test]
    fn json_carries_tag_and_detail() {
        let r = Report::new(
            id(),
            Outcome::StorageFetchError {
                storage_path: "a/b.pdf".into(),
                error: ServiceErrorDetail {
                    kind: ErrorKind::Http,
                    http_status: Some(400),
                    body: ErrorBody {
                        code: Some("not_found".into()),
                        message: Some("Object not found".into()),
                        status_code: Some("404".into()),
                        ..ErrorBody::default()
                    },
                },
            },
        );
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["record_id"], "rec-1");
        assert_eq!(v["outcome"]["tag"], "StorageFetchError");
        assert_eq!(v["outcome"]["storage_path"], "a/b.pdf");
        assert_eq!(v["outcome"]["error"]["kind"], "http");
        assert_eq!(v["outcome"]["error"]["http_status"], 400);
        assert_eq!(v["outcome"]["error"]["message"], "Object not found");
        assert_eq!(v["outcome"]["error"]["status_code"], "404");
        assert!(v["outcome"]["error"].get("hint").is_none());
    }

    #[test]
    fn tags_are_distinct() {
        let outcomes = [
            Outcome::NotFound,
            Outcome::MissingLinkage {
                gap: LinkageGap::MissingStoragePath,
            },
            Outcome::Success {
                size: 1,
                content_type: "x".into(),
                sha256: String::new(),
            },
        ];
        let tags: Vec<ReportTag> = outcomes.iter().map(Outcome::tag).collect();
        assert_eq!(
            tags,
            [ReportTag::NotFound, ReportTag::MissingLinkage, ReportTag::Success]
        );
    }
}
