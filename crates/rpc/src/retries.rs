//! Transport-level retry policy for the JSON-RPC client.
use std::time::Duration;

use alloy::transports::{
    RpcError, TransportError,
    layers::{RetryBackoffLayer, RetryPolicy},
};
use alloy_json_rpc::ErrorPayload;
use serde::Deserialize;

/// Maximum number of retries for a retryable transport error.
const MAX_RETRIES: u32 = 9;

/// Initial backoff in milliseconds, doubled on each retry.
const INITIAL_BACKOFF_MS: u64 = 1;

/// Compute units per second assumed for the node.
const COMPUTE_UNITS_PER_SECOND: u64 = 100;

/// The [`RetryBackoffLayer`] installed on every [`crate::ChainClient`].
pub const DEFAULT_RETRY_LAYER: RetryBackoffLayer<ConnRefusedRetryPolicy> =
    RetryBackoffLayer::new_with_policy(
        MAX_RETRIES,
        INITIAL_BACKOFF_MS,
        COMPUTE_UNITS_PER_SECOND,
        ConnRefusedRetryPolicy,
    );

/// Retries rate-limit and server-side errors as well as refused connections.
///
/// Only transport hiccups are retried. A JSON-RPC error that is not a rate limit
/// (unknown block, invalid params) surfaces immediately.
#[derive(Debug, Clone, Copy)]
pub struct ConnRefusedRetryPolicy;

impl RetryPolicy for ConnRefusedRetryPolicy {
    fn should_retry(&self, error: &TransportError) -> bool {
        is_retryable(error) || is_connection_refused(error)
    }

    fn backoff_hint(&self, _error: &TransportError) -> Option<Duration> {
        None
    }
}

fn is_retryable(error: &TransportError) -> bool {
    match error {
        RpcError::Transport(kind) => kind.is_retry_err(),
        RpcError::ErrorResp(payload) => payload.is_retry_err(),
        RpcError::NullResp => true,
        RpcError::DeserError { text, .. } => {
            // some nodes omit the `id` on errors, so the body is only an error object
            #[derive(Deserialize)]
            struct Resp {
                error: ErrorPayload,
            }

            serde_json::from_str::<ErrorPayload>(text)
                .map(|payload| payload.is_retry_err())
                .or_else(|_| serde_json::from_str::<Resp>(text).map(|r| r.error.is_retry_err()))
                .unwrap_or(false)
        }
        _ => false,
    }
}

/// Checks whether the error message contains "connection refused".
#[inline]
pub fn is_connection_refused<S: ToString>(e: S) -> bool {
    e.to_string().to_lowercase().contains("connection refused")
}
