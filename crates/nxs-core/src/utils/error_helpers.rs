use crate::error::{DeviceError, StorageError};
use std::path::Path;

/// Convert reqwest errors to DeviceError with endpoint context
pub fn convert_request_error(error: reqwest::Error, endpoint: &str) -> DeviceError {
    DeviceError::Http {
        status: error.status().map(|s| s.as_u16()).unwrap_or(0),
        endpoint: endpoint.to_string(),
        message: error.to_string(),
    }
}

/// Convert JSON deserialization errors to DeviceError with endpoint context
pub fn convert_json_error(error: reqwest::Error, endpoint: &str) -> DeviceError {
    DeviceError::Http {
        status: 0,
        endpoint: endpoint.to_string(),
        message: format!("JSON parse error: {}", error),
    }
}

/// A reply that does not have the shape the caller expects
pub fn bad_reply(device: &str, message: impl Into<String>) -> DeviceError {
    DeviceError::BadReply {
        device: device.to_string(),
        message: message.into(),
    }
}

/// Convert IO errors to StorageError with path context
pub fn convert_io_error(error: std::io::Error, path: &Path) -> StorageError {
    StorageError::FileIo {
        path: path.to_string_lossy().to_string(),
        source: error,
    }
}
