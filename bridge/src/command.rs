use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur when encoding or decoding bridge commands.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The command could not be converted to or from JSON.
    #[error("malformed bridge command: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A single call forwarded across the bridge.
///
/// Arguments are positional. Bridges that speak JSON can use
/// [`to_json`](Self::to_json) to obtain the wire form, e.g.
/// `{"service":"Camera","action":"takePicture","args":[80,0,1],"callbackId":1}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeCommand {
    /// Name of the target capability, e.g. `"Camera"`.
    pub service: String,
    /// Operation to perform on the capability.
    pub action: String,
    /// Positional arguments.
    #[serde(default)]
    pub args: Vec<Value>,
    /// Correlation token the native side may echo back with its result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_id: Option<u64>,
}

impl BridgeCommand {
    /// Create a command with no arguments.
    pub fn new(service: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            action: action.into(),
            args: Vec::new(),
            callback_id: None,
        }
    }

    /// Append a positional argument.
    #[must_use]
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Attach a correlation token.
    #[must_use]
    pub const fn with_callback_id(mut self, id: u64) -> Self {
        self.callback_id = Some(id);
        self
    }

    /// Encode the command as JSON.
    ///
    /// # Errors
    /// Returns [`BridgeError::Malformed`] if serialization fails.
    pub fn to_json(&self) -> Result<String, BridgeError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a command from JSON.
    ///
    /// # Errors
    /// Returns [`BridgeError::Malformed`] if the input is not a valid command.
    pub fn from_json(json: &str) -> Result<Self, BridgeError> {
        Ok(serde_json::from_str(json)?)
    }
}
