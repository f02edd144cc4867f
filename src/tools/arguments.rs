//! Typed access to tool call arguments.

use crate::error::FoundryError;

/// Arguments of a function call requested by a run.
#[derive(Debug, Clone)]
pub struct ToolArguments {
    value: serde_json::Value,
}

impl ToolArguments {
    pub fn new(value: serde_json::Value) -> Self {
        Self { value }
    }

    /// Parse the JSON-encoded argument string sent by the service.
    ///
    /// An empty string means "no arguments".
    pub fn parse(raw: &str) -> Result<Self, FoundryError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Self::new(serde_json::json!({})));
        }
        serde_json::from_str(trimmed)
            .map(Self::new)
            .map_err(|e| FoundryError::InvalidArgument(format!("Arguments are not valid JSON: {e}")))
    }

    pub fn raw(&self) -> &serde_json::Value {
        &self.value
    }

    pub fn get_str(&self, key: &str) -> Result<&str, FoundryError> {
        self.value
            .get(key)
            .and_then(|v| v.as_str())
            .ok_or_else(|| FoundryError::InvalidArgument(format!("Missing string argument: {key}")))
    }

    pub fn get_str_opt(&self, key: &str) -> Option<&str> {
        self.value.get(key).and_then(|v| v.as_str())
    }

    pub fn get_f64(&self, key: &str) -> Result<f64, FoundryError> {
        self.value
            .get(key)
            .and_then(|v| v.as_f64())
            .ok_or_else(|| FoundryError::InvalidArgument(format!("Missing number argument: {key}")))
    }

    /// Deserialize the whole argument object into a typed struct.
    pub fn deserialize<T: serde::de::DeserializeOwned>(&self) -> Result<T, FoundryError> {
        serde_json::from_value(self.value.clone()).map_err(|e| {
            FoundryError::InvalidArgument(format!("Failed to deserialize arguments: {e}"))
        })
    }
}
