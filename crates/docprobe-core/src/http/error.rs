//! Transport-level failures, classified from curl errors.

use crate::cancel::{CancelToken, Cancelled};

/// A request that never produced an HTTP response.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Stopped through the `CancelToken`, before or during the transfer.
    #[error("request cancelled")]
    Cancelled,
    /// Connect or total timeout elapsed.
    #[error("timed out: {0}")]
    Timeout(#[source] curl::Error),
    /// DNS, connect, send or receive failure.
    #[error("connection failed: {0}")]
    Connection(#[source] curl::Error),
    /// Building the request failed (bad URL, bad header).
    #[error("invalid request: {0}")]
    Setup(#[source] curl::Error),
    /// Any other curl failure.
    #[error("{0}")]
    Curl(#[source] curl::Error),
}

impl From<Cancelled> for TransportError {
    fn from(_: Cancelled) -> Self {
        TransportError::Cancelled
    }
}

impl TransportError {
    /// Classify a failed `perform()`. An abort from the progress callback
    /// only counts as cancellation when the token is actually set.
    pub(crate) fn from_curl(e: curl::Error, cancel: &CancelToken) -> Self {
        if e.is_aborted_by_callback() && cancel.is_cancelled() {
            return TransportError::Cancelled;
        }
        if e.is_operation_timedout() {
            return TransportError::Timeout(e);
        }
        if e.is_couldnt_connect()
            || e.is_couldnt_resolve_host()
            || e.is_couldnt_resolve_proxy()
            || e.is_read_error()
            || e.is_recv_error()
            || e.is_send_error()
            || e.is_got_nothing()
        {
            return TransportError::Connection(e);
        }
        TransportError::Curl(e)
    }
}
