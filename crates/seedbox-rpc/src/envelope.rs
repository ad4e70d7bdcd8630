//! Request/response envelope codec.
//!
//! Requests are `{"method": ..., "arguments": ...}` with `arguments` left out
//! entirely when a method takes none; some daemon methods reject an empty
//! object. Responses are `{"result": ..., "arguments": ...}` where only the
//! string `"success"` means the call went through.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::RpcError;

/// The `result` value the daemon sends for a successful call.
pub const SUCCESS: &str = "success";

/// Result shape for methods whose response payload is irrelevant.
///
/// Accepts any `arguments` value (including a missing one) without
/// allocating.
pub type NoResult = serde::de::IgnoredAny;

/// Outgoing request envelope.
#[derive(Debug, Serialize)]
pub struct Request<'a, P> {
    pub method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<&'a P>,
}

#[derive(Debug, Deserialize)]
struct RawResponse {
    result: String,
    #[serde(default)]
    arguments: serde_json::Value,
}

/// A decoded response: either the typed payload or the daemon's message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<R> {
    Success(R),
    Failure(String),
}

impl<R> Outcome<R> {
    /// Convert a failure into [`RpcError::Domain`] tagged with `method`.
    pub fn into_result(self, method: &str) -> Result<R, RpcError> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(message) => Err(RpcError::Domain {
                method: method.to_string(),
                message,
            }),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }
}

/// Serialize a request envelope to JSON bytes.
pub fn encode_request<P: Serialize>(method: &str, arguments: Option<&P>) -> Result<Vec<u8>, RpcError> {
    serde_json::to_vec(&Request { method, arguments }).map_err(|source| RpcError::Encode {
        method: method.to_string(),
        source,
    })
}

/// Parse a response envelope, decoding `arguments` as `R` only on success.
pub fn decode_response<R: DeserializeOwned>(method: &str, body: &[u8]) -> Result<Outcome<R>, RpcError> {
    let decode_err = |source| RpcError::Decode {
        method: method.to_string(),
        source,
    };

    let raw: RawResponse = serde_json::from_slice(body).map_err(decode_err)?;
    if raw.result != SUCCESS {
        return Ok(Outcome::Failure(raw.result));
    }
    let value = serde_json::from_value(raw.arguments).map_err(decode_err)?;
    Ok(Outcome::Success(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    #[derive(Debug, Serialize)]
    struct Args {
        path: String,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct FreeSpace {
        path: String,
        #[serde(rename = "size-bytes")]
        size_bytes: i64,
    }

    #[test]
    fn test_encode_without_arguments_has_no_key() {
        let bytes = encode_request::<Args>("session-stats", None).unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value, json!({"method": "session-stats"}));
        assert!(value.get("arguments").is_none());
    }

    #[test]
    fn test_encode_with_arguments() {
        let args = Args {
            path: "/data".to_string(),
        };
        let bytes = encode_request("free-space", Some(&args)).unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value, json!({"method": "free-space", "arguments": {"path": "/data"}}));
    }

    #[test]
    fn test_decode_success() {
        let body = br#"{"result":"success","arguments":{"path":"/data","size-bytes":1024}}"#;
        let outcome = decode_response::<FreeSpace>("free-space", body).unwrap();
        assert_eq!(
            outcome,
            Outcome::Success(FreeSpace {
                path: "/data".to_string(),
                size_bytes: 1024,
            })
        );
    }

    #[test]
    fn test_decode_failure_keeps_message_verbatim() {
        let body = br#"{"result":"invalid argument","arguments":{}}"#;
        let outcome = decode_response::<FreeSpace>("free-space", body).unwrap();
        assert_eq!(outcome, Outcome::Failure("invalid argument".to_string()));

        let err = outcome.into_result("free-space").unwrap_err();
        assert_eq!(err.domain_message(), Some("invalid argument"));
    }

    #[test]
    fn test_failure_ignores_malformed_arguments() {
        let body = br#"{"result":"no such file","arguments":"garbage"}"#;
        let outcome = decode_response::<FreeSpace>("free-space", body).unwrap();
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_no_result_accepts_anything() {
        for body in [
            &br#"{"result":"success","arguments":{"a":[1,2,3]}}"#[..],
            &br#"{"result":"success","arguments":{}}"#[..],
            &br#"{"result":"success"}"#[..],
        ] {
            let outcome = decode_response::<NoResult>("torrent-start", body).unwrap();
            assert!(outcome.is_success());
        }
    }

    #[test]
    fn test_malformed_envelope_is_decode_error() {
        let err = decode_response::<NoResult>("torrent-start", b"<html>").unwrap_err();
        assert!(matches!(err, RpcError::Decode { ref method, .. } if method == "torrent-start"));
        assert!(!err.is_domain());
    }

    #[test]
    fn test_payload_shape_mismatch_is_decode_error() {
        let body = br#"{"result":"success","arguments":{"path":7}}"#;
        let err = decode_response::<FreeSpace>("free-space", body).unwrap_err();
        assert!(matches!(err, RpcError::Decode { .. }));
    }
}
