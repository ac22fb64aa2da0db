//! Retrying GET against the node.
//!
//! Every attempt, retries included, first passes the client's rate limiter.
//! Only 429s and network-level failures are retried, with exponential
//! backoff; an `ok: false` envelope is a logical failure and surfaces at once.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::{sleep, Duration};

use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::rate_limit::RateLimiter;
use crate::rpc_utils::{HttpReply, HttpTransport};
use crate::types::ApiResponse;

pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// `base * 2^retry_count`: 1s, 2s, 4s with the default base.
pub fn backoff_delay(base: Duration, retry_count: u32) -> Duration {
    base.saturating_mul(1u32 << retry_count.min(16))
}

pub async fn get_with_backoff<T: DeserializeOwned>(
    transport: &dyn HttpTransport,
    limiter: &RateLimiter,
    cfg: &ClientConfig,
    base_url: &str,
    endpoint: &str,
    params: &[(&str, String)],
) -> Result<T> {
    let url = format!("{base_url}{endpoint}");
    let mut retry_count = 0u32;
    loop {
        limiter.wait_if_needed().await;

        let outcome = match transport.get(&url, params, cfg.request_timeout).await {
            Ok(reply) => unwrap_envelope::<T>(endpoint, reply),
            Err(e) => Err(ApiError::from_transport(endpoint, e)),
        };

        match outcome {
            Ok(v) => return Ok(v),
            Err(e) => {
                log::error!("[stellarx][net] API error for {endpoint}: {e}");
                if e.is_retryable() && retry_count < cfg.max_retries {
                    let delay = backoff_delay(cfg.retry_delay, retry_count);
                    log::info!(
                        "[stellarx][net] retrying {} in {}ms (attempt {}/{})",
                        endpoint,
                        delay.as_millis(),
                        retry_count + 1,
                        cfg.max_retries
                    );
                    sleep(delay).await;
                    retry_count += 1;
                    continue;
                }
                return Err(e);
            }
        }
    }
}

/// Map status codes to the error taxonomy and unwrap `{ ok, result }`.
pub fn unwrap_envelope<T: DeserializeOwned>(endpoint: &str, reply: HttpReply) -> Result<T> {
    if !reply.is_success() {
        return Err(ApiError::from_status(endpoint, reply.status));
    }
    let envelope: ApiResponse<Value> =
        serde_json::from_str(&reply.body).map_err(|source| ApiError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })?;
    if !envelope.ok {
        return Err(ApiError::Rejected {
            endpoint: endpoint.to_string(),
        });
    }
    serde_json::from_value(envelope.result.unwrap_or(Value::Null)).map_err(|source| {
        ApiError::Decode {
            endpoint: endpoint.to_string(),
            source,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(status: u16, body: &str) -> HttpReply {
        HttpReply {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_backoff_doubles() {
        let base = DEFAULT_RETRY_DELAY;
        assert_eq!(backoff_delay(base, 0), Duration::from_millis(1000));
        assert_eq!(backoff_delay(base, 1), Duration::from_millis(2000));
        assert_eq!(backoff_delay(base, 2), Duration::from_millis(4000));
    }

    #[test]
    fn test_envelope_ok() {
        let v: Vec<u32> = unwrap_envelope("/x", reply(200, r#"{"ok":true,"result":[1,2]}"#)).unwrap();
        assert_eq!(v, vec![1, 2]);
    }

    #[test]
    fn test_envelope_rejected() {
        let err = unwrap_envelope::<Value>("/x", reply(200, r#"{"ok":false,"error":"nope"}"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::Rejected { .. }));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_envelope_schema_mismatch() {
        let err = unwrap_envelope::<Vec<u32>>("/x", reply(200, r#"{"ok":true,"result":"x"}"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));

        let err = unwrap_envelope::<Value>("/x", reply(200, "<html>")).unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }

    #[test]
    fn test_status_checked_before_body() {
        let err = unwrap_envelope::<Value>("/get_blocks", reply(422, "")).unwrap_err();
        assert!(matches!(err, ApiError::RequestTooLarge { .. }));
    }
}
