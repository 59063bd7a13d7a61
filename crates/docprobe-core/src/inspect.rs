//! Table introspection: which columns does each table expose, and is it reachable at all.

use crate::cancel::CancelToken;
use crate::data_service::DataService;
use crate::report::ServiceErrorDetail;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "tag", rename_all = "snake_case")]
pub enum TableOutcome {
    /// Column names of the sampled row, in the order the service returned them.
    Columns { columns: Vec<String> },
    /// Reachable, but no rows to learn columns from.
    Empty,
    Error { error: ServiceErrorDetail },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableReport {
    pub table: String,
    pub outcome: TableOutcome,
}

impl fmt::Display for TableReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            TableOutcome::Columns { columns } => {
                write!(f, "{}: {} columns: {}", self.table, columns.len(), columns.join(", "))
            }
            TableOutcome::Empty => write!(f, "{}: reachable, no rows", self.table),
            TableOutcome::Error { error } => write!(f, "{}: {}", self.table, error),
        }
    }
}

/// Sample one row from each table in turn. A failing table does not stop the rest.
pub fn inspect_tables<D>(data: &D, tables: &[String], cancel: &CancelToken) -> Vec<TableReport>
where
    D: DataService,
{
    tables
        .iter()
        .map(|table| {
            let outcome = match data.sample_row(table, cancel) {
                Ok(Some(row)) => TableOutcome::Columns {
                    columns: row.keys().cloned().collect(),
                },
                Ok(None) => TableOutcome::Empty,
                Err(e) => {
                    tracing::warn!(table = %table, "table sample failed: {}", e);
                    TableOutcome::Error {
                        error: ServiceErrorDetail::from(&e),
                    }
                }
            };
            TableReport {
                table: table.clone(),
                outcome,
            }
        })
        .collect()
}
