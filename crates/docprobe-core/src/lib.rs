pub mod config;
pub mod logging;

pub mod cancel;
pub mod checksum;
pub mod data_service;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod inspect;
pub mod model;
pub mod object_store;
pub mod report;
pub mod resolver;
pub mod save;

pub use cancel::CancelToken;
pub use model::{LinkedDocument, Payload, Record, RecordId};
pub use report::{Outcome, Report, ReportTag};
pub use resolver::{Resolution, Resolver};
