use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One request on the wire: `{"id": <n>, "<command>": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: u64,
    #[serde(flatten)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Init {
        model_path: String,
    },
    ClearKvCache {},
    Infer {
        image_path: String,
        prompt: String,
        n_predict: u32,
    },
}

impl Command {
    /// Human-readable operation name used in logs and error messages.
    pub fn operation(&self) -> &'static str {
        match self {
            Command::Init { .. } => "Initialization",
            Command::ClearKvCache {} => "Clearing KV cache",
            Command::Infer { .. } => "Inference",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Payload of a successful `infer` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferResult {
    pub text: String,
}

impl Response {
    pub fn ok(result: Value) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error.into()),
        }
    }

    /// Turns a `success=false` response into a `RemoteOperation` error.
    pub fn into_result(self, operation: &str) -> Result<Option<Value>> {
        if self.success {
            Ok(self.result)
        } else {
            let message = self.error.unwrap_or_else(|| "unknown error".to_string());
            Err(Error::remote(operation, message))
        }
    }

    pub fn infer_text(self) -> Result<String> {
        let result = self
            .into_result("Inference")?
            .ok_or_else(|| Error::protocol("infer response is missing the result field"))?;
        let result: InferResult = serde_json::from_value(result)
            .map_err(|e| Error::protocol(format!("Malformed infer result: {}", e)))?;
        Ok(result.text)
    }
}
