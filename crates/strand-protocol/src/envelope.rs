use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ProtocolError, ProtocolResult};

/// Response envelope: `{"result": <value>}` or `{"error": "<message>"}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Envelope {
    Result(Value),
    Error(String),
}

impl Envelope {
    pub fn ok(result: Value) -> Self {
        Envelope::Result(result)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Envelope::Error(message.into())
    }

    /// Parse a raw response body.
    pub fn decode(raw: Value) -> ProtocolResult<Self> {
        serde_json::from_value(raw).map_err(|e| ProtocolError::MalformedEnvelope(e.to_string()))
    }

    pub fn to_json(&self) -> Value {
        match self {
            Envelope::Result(v) => serde_json::json!({ "result": v }),
            Envelope::Error(m) => serde_json::json!({ "error": m }),
        }
    }

    /// The result payload, or the remote's error as [`ProtocolError::Remote`].
    pub fn into_value(self) -> ProtocolResult<Value> {
        match self {
            Envelope::Result(v) => Ok(v),
            Envelope::Error(m) => Err(ProtocolError::Remote(m)),
        }
    }

    pub fn into_typed<T: DeserializeOwned>(self) -> ProtocolResult<T> {
        let value = self.into_value()?;
        serde_json::from_value(value).map_err(|e| ProtocolError::Decode(e.to_string()))
    }
}
