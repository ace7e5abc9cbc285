// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! HTTP sender used by `summarize --relay-url`.

use serde_json::Value;
use std::time::Duration;
use transport_guard::SendError;

/// Posts JSON payloads to a fixed URL.
pub struct HttpRelay {
    client: reqwest::blocking::Client,
    url: String,
}

impl HttpRelay {
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            url: url.into(),
        })
    }

    /// Sends one payload. The response body is returned as JSON when it
    /// parses, otherwise as a JSON string.
    pub fn send(&self, payload: &Value) -> Result<Value, SendError> {
        let response = self
            .client
            .post(&self.url)
            .json(payload)
            .send()
            .map_err(|e| SendError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response.text().map_err(|e| SendError::Request(e.to_string()))?;
        classify(status, body)
    }
}

/// Maps an HTTP status and body to the send result.
fn classify(status: u16, body: String) -> Result<Value, SendError> {
    match status {
        200..=299 => Ok(serde_json::from_str(&body).unwrap_or(Value::String(body))),
        413 => Err(SendError::PayloadTooLarge(body)),
        _ => Err(SendError::Status { status, body }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_success() {
        assert_eq!(classify(200, r#"{"ok":true}"#.into()).unwrap(), serde_json::json!({"ok": true}));
        assert_eq!(classify(204, "done".into()).unwrap(), Value::String("done".into()));
    }

    #[test]
    fn test_classify_too_large() {
        assert!(matches!(classify(413, String::new()), Err(SendError::PayloadTooLarge(_))));
    }

    #[test]
    fn test_classify_other_status() {
        let err = classify(400, "maximum context length exceeded".into()).unwrap_err();
        assert!(matches!(err, SendError::Status { status: 400, .. }));
        assert!(transport_guard::is_oversized_error(&err));
        assert!(!transport_guard::is_oversized_error(&classify(503, "busy".into()).unwrap_err()));
    }
}
