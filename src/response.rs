//! Boundary-safe response shapes
//!
//! Hosts that embed the SDK (FFI, WASM, scripting bridges) receive every
//! result as a small JSON object carrying either a payload or a single error
//! string. This is the only layer that flattens a [`Report`] into text.

use crate::error::{error_string, Report, Result};
use crate::signer::ApiKeyPair;
use crate::txtypes::SignedTransaction;
use serde::{Deserialize, Serialize};

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|e| serde_json::json!({ "error": format!("JSON marshal error: {e}") }).to_string())
}

/// Payload string or error, used for signed transactions and auth tokens
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringResponse {
    #[serde(default)]
    pub result: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StringResponse {
    /// Wrap a signing result; the payload is the JSON record including `MessageToSign`
    pub fn from_signed(result: Result<SignedTransaction>) -> Self {
        result
            .and_then(|signed| Ok(serde_json::to_string(&signed)?))
            .into()
    }

    pub fn to_json(&self) -> String {
        to_json(self)
    }
}

impl From<Result<String>> for StringResponse {
    fn from(result: Result<String>) -> Self {
        match result {
            Ok(result) => Self { result, error: None },
            Err(report) => Self::from(report),
        }
    }
}

impl From<Report> for StringResponse {
    fn from(report: Report) -> Self {
        Self {
            result: String::new(),
            error: Some(error_string(&report)),
        }
    }
}

/// Error-only response for operations with no payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorResponse {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn to_json(&self) -> String {
        to_json(self)
    }
}

impl<E: Into<Report>> From<std::result::Result<(), E>> for ErrorResponse {
    fn from(result: std::result::Result<(), E>) -> Self {
        Self {
            error: result.err().map(|e| error_string(&e.into())),
        }
    }
}

/// Generated API key pair or error
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyResponse {
    #[serde(default)]
    pub private_key: String,
    #[serde(default)]
    pub public_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiKeyResponse {
    pub fn to_json(&self) -> String {
        to_json(self)
    }
}

impl From<Result<ApiKeyPair>> for ApiKeyResponse {
    fn from(result: Result<ApiKeyPair>) -> Self {
        match result {
            Ok(pair) => Self {
                private_key: pair.private_key,
                public_key: pair.public_key,
                error: None,
            },
            Err(report) => Self {
                error: Some(error_string(&report)),
                ..Self::default()
            },
        }
    }
}
