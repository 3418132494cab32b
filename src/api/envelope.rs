use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The uniform response wrapper both storage modes produce:
/// `{success:true, data}` on success, `{success:false, error}` on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Envelope {
    pub fn success(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Fetch-shaped response: an `ok` flag, an HTTP-status-equivalent code, and
/// the JSON envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub ok: bool,
    pub status: u16,
    envelope: Envelope,
}

impl ApiResponse {
    pub fn success(status: u16, data: Value) -> Self {
        Self {
            ok: (200..300).contains(&status),
            status,
            envelope: Envelope::success(data),
        }
    }

    pub fn failure(status: u16, message: impl Into<String>) -> Self {
        Self {
            ok: (200..300).contains(&status),
            status,
            envelope: Envelope::failure(message),
        }
    }

    /// The response body, named after the fetch accessor callers expect.
    pub fn json(&self) -> &Envelope {
        &self.envelope
    }
}
