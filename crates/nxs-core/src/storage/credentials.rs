//! REST gateway credentials
//!
//! Basic-auth credentials come from `NXS_REST_USER` and `NXS_REST_PASSWORD`.
//! Nothing is persisted.

use std::env;

pub const REST_USER_ENV: &str = "NXS_REST_USER";
pub const REST_PASSWORD_ENV: &str = "NXS_REST_PASSWORD";

/// User and password for the gateway, if a user is configured
pub fn get_rest_credentials() -> Option<(String, String)> {
    credentials_from(
        env::var(REST_USER_ENV).ok(),
        env::var(REST_PASSWORD_ENV).ok(),
    )
}

fn credentials_from(user: Option<String>, password: Option<String>) -> Option<(String, String)> {
    let user = user.filter(|u| !u.is_empty())?;
    Some((user, password.unwrap_or_default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_require_user() {
        assert_eq!(credentials_from(None, Some("secret".into())), None);
        assert_eq!(credentials_from(Some(String::new()), None), None);
    }

    #[test]
    fn test_credentials_default_empty_password() {
        assert_eq!(
            credentials_from(Some("tango-cs".into()), None),
            Some(("tango-cs".to_string(), String::new()))
        );
        assert_eq!(
            credentials_from(Some("tango-cs".into()), Some("tango".into())),
            Some(("tango-cs".to_string(), "tango".to_string()))
        );
    }
}
