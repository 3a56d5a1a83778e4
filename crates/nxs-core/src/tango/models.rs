use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of a command execution request.
#[derive(Debug, Clone, Serialize)]
pub struct CommandInput<'a> {
    pub input: &'a Value,
}

/// Reply of `PUT .../commands/{cmd}`.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandResult {
    pub name: String,
    #[serde(default)]
    pub output: Value,
}

/// Reply of `GET .../attributes/{attr}/value`.
#[derive(Debug, Clone, Deserialize)]
pub struct AttributeValue {
    pub name: String,
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub quality: Option<String>,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

/// Reply of `GET .../state`.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceStateReply {
    pub state: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// One entry of `GET .../attributes`.
#[derive(Debug, Clone, Deserialize)]
pub struct AttributeEntry {
    pub name: String,
}

/// Error payload sent by the gateway on failed calls.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayFailure {
    #[serde(default)]
    pub errors: Vec<GatewayErrorItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayErrorItem {
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub description: String,
}

impl GatewayFailure {
    /// First error as `REASON: description`, if the body carried any.
    pub fn summary(&self) -> Option<String> {
        self.errors.first().map(|e| {
            if e.reason.is_empty() {
                e.description.clone()
            } else {
                format!("{}: {}", e.reason, e.description)
            }
        })
    }
}
