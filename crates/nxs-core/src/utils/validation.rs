//! Input validation utilities

use crate::error::{CliError, UtilsError};

/// Validate that a URL is properly formatted
pub fn validate_url(url: &str) -> crate::Result<()> {
    if url.is_empty() {
        return Err(CliError::InvalidArguments("URL cannot be empty".to_string()).into());
    }

    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(CliError::InvalidArguments(format!(
            "Invalid URL '{}': URL must start with http:// or https://",
            url
        ))
        .into());
    }

    Ok(())
}

/// Validate a JSON document passed on the command line
pub fn validate_json(text: &str) -> Result<serde_json::Value, UtilsError> {
    serde_json::from_str(text).map_err(|e| UtilsError::Validation {
        message: format!("invalid JSON: {}", e),
    })
}

/// Component, datasource and profile names are single non-empty words
pub fn validate_name(name: &str) -> crate::Result<()> {
    if name.trim().is_empty() {
        return Err(CliError::InvalidArguments("Name cannot be empty".to_string()).into());
    }
    if name.chars().any(char::is_whitespace) || name.contains('/') {
        return Err(CliError::InvalidArguments(format!(
            "Invalid name '{}': whitespace and '/' are not allowed",
            name
        ))
        .into());
    }
    Ok(())
}
