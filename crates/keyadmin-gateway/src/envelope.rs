//! Response body decoding and envelope unwrapping
//!
//! Key, provider, package, audit and stats resources travel bare. The proxy
//! namespace wraps every payload in `{ success, data, message }` and the
//! bank-info resource in `{ success, bankInfo, error }`. Both are unwrapped
//! here so callers only ever see typed resources.

use crate::error::{GatewayError, GatewayResult};
use keyadmin_core::types::BankInfo;
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// `{ success, data, message }` as used by the proxy namespace
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(default)]
    success: bool,
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
}

impl<T> Envelope<T> {
    /// Unwrap the payload, turning `success: false` into a server error
    pub(crate) fn into_data(self, status: u16) -> GatewayResult<T> {
        if !self.success {
            return Err(GatewayError::server(
                status,
                self.message
                    .unwrap_or_else(|| "request was not successful".to_string()),
            ));
        }
        self.data
            .ok_or_else(|| GatewayError::invalid_response("envelope is missing its data field"))
    }

    /// Check the success flag, discarding any payload
    pub(crate) fn into_ack(self, status: u16) -> GatewayResult<Option<String>> {
        if self.success {
            Ok(self.message)
        } else {
            Err(GatewayError::server(
                status,
                self.message
                    .unwrap_or_else(|| "request was not successful".to_string()),
            ))
        }
    }
}

/// `{ success, bankInfo, error }` as used by the bank-info resource
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BankEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    bank_info: Option<BankInfo>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl BankEnvelope {
    pub(crate) fn into_bank_info(self, status: u16) -> GatewayResult<Option<BankInfo>> {
        if self.success {
            Ok(self.bank_info)
        } else {
            Err(GatewayError::server(
                status,
                self.error
                    .or(self.message)
                    .unwrap_or_else(|| "request was not successful".to_string()),
            ))
        }
    }
}

/// Decode a 2xx body; an empty body decodes as `{}`
pub(crate) fn decode_body<T: DeserializeOwned>(body: &str) -> GatewayResult<T> {
    let body = if body.trim().is_empty() { "{}" } else { body };
    serde_json::from_str(body)
        .map_err(|e| GatewayError::invalid_response(format!("could not decode body: {e}")))
}

/// Message for a non-2xx response: the body's `message`, else its `error`,
/// else a generic status line
pub(crate) fn error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "error"].iter().find_map(|field| {
                value
                    .get(field)
                    .and_then(serde_json::Value::as_str)
                    .filter(|text| !text.trim().is_empty())
                    .map(str::to_string)
            })
        })
        .unwrap_or_else(|| format!("server error: status {status}"))
}
