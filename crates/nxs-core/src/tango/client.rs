use crate::error::DeviceError;
use crate::tango::models::GatewayFailure;
use crate::tango::{DeviceName, TangoHost};
use crate::utils::error_helpers::{convert_json_error, convert_request_error};
use crate::utils::retry::{RetryConfig, RetryExecutor};
use reqwest::{Client, Method, RequestBuilder, Response};
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const REST_API_PREFIX: &str = "/tango/rest/rc4";
const USER_AGENT: &str = concat!("nxstools/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the Tango REST gateway.
#[derive(Debug, Clone)]
pub struct TangoClient {
    client: Client,
    pub base_url: String,
    pub tango_host: TangoHost,
    pub username: Option<String>,
    password: Option<String>,
    timeout_secs: u64,
    retry: RetryConfig,
}

impl TangoClient {
    pub fn new(base_url: String, tango_host: TangoHost) -> Result<Self, DeviceError> {
        Self::with_timeout(base_url, tango_host, DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(
        base_url: String,
        tango_host: TangoHost,
        timeout_secs: u64,
    ) -> Result<Self, DeviceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| convert_request_error(e, "client_init"))?;

        Ok(TangoClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            tango_host,
            username: None,
            password: None,
            timeout_secs,
            retry: RetryConfig::default(),
        })
    }

    pub fn with_credentials(mut self, username: String, password: String) -> Self {
        self.username = Some(username);
        self.password = Some(password);
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.username.is_some()
    }

    /// Gateway path of a device, routed through its own host when it has one.
    pub fn device_path(&self, device: &DeviceName) -> String {
        let host = device.resolve_host(&self.tango_host);
        format!(
            "{}/hosts/{}/{}/devices/{}",
            REST_API_PREFIX, host.host, host.port, device.path
        )
    }

    pub fn build_request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.request(method, url);

        if let Some(username) = &self.username {
            request = request.basic_auth(username, self.password.as_ref());
        }

        request
    }

    /// Send a request once; used for commands and attribute writes.
    pub async fn send<T>(&self, request: RequestBuilder, endpoint: &str) -> Result<T, DeviceError>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                DeviceError::Timeout {
                    timeout_secs: self.timeout_secs,
                    endpoint: endpoint.to_string(),
                }
            } else {
                convert_request_error(e, endpoint)
            }
        })?;
        self.handle_response(response, endpoint).await
    }

    /// GET with retries on transient gateway failures.
    pub async fn get<T>(&self, path: &str) -> Result<T, DeviceError>
    where
        T: serde::de::DeserializeOwned,
    {
        let executor = RetryExecutor::new(self.retry.clone());
        executor
            .execute(move || {
                let request = self.build_request(Method::GET, path);
                async move { self.send(request, path).await }
            })
            .await
    }

    /// GET sent once; for reads a caller polls on its own.
    pub async fn get_once<T>(&self, path: &str) -> Result<T, DeviceError>
    where
        T: serde::de::DeserializeOwned,
    {
        let request = self.build_request(Method::GET, path);
        self.send(request, path).await
    }

    pub async fn handle_response<T>(
        &self,
        response: Response,
        endpoint: &str,
    ) -> Result<T, DeviceError>
    where
        T: serde::de::DeserializeOwned,
    {
        let status = response.status();

        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| convert_json_error(e, endpoint));
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let message = serde_json::from_str::<GatewayFailure>(&error_text)
            .ok()
            .and_then(|failure| failure.summary())
            .unwrap_or(error_text);

        match status.as_u16() {
            401 | 403 => Err(DeviceError::Unauthorized {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
                server_message: message,
            }),
            404 => Err(DeviceError::NotFound {
                endpoint: endpoint.to_string(),
            }),
            408 | 504 => Err(DeviceError::Timeout {
                timeout_secs: self.timeout_secs,
                endpoint: endpoint.to_string(),
            }),
            _ => Err(DeviceError::Http {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
                message,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use wiremock::matchers::{header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: String) -> TangoClient {
        TangoClient::new(base_url, TangoHost::new("haso000", 10000))
            .expect("client creation failed")
            .with_retry(RetryConfig {
                max_retries: 2,
                initial_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(2),
                multiplier: 1.0,
            })
    }

    #[test]
    fn test_client_creation_trims_base_url() {
        let client = test_client("http://gateway.test:8080/".to_string());
        assert_eq!(client.base_url, "http://gateway.test:8080");
        assert!(!client.is_authenticated());
    }

    #[test]
    fn test_device_path_uses_default_or_own_host() {
        let client = test_client("http://gateway.test".to_string());

        let device: DeviceName = "p09/nxsdatawriter/haso000".parse().expect("valid name");
        assert_eq!(
            client.device_path(&device),
            "/tango/rest/rc4/hosts/haso000/10000/devices/p09/nxsdatawriter/haso000"
        );

        let device: DeviceName = "remote:20000/sys/database/2".parse().expect("valid name");
        assert_eq!(
            client.device_path(&device),
            "/tango/rest/rc4/hosts/remote/20000/devices/sys/database/2"
        );
    }

    #[test]
    fn test_build_request_with_credentials() {
        let client = test_client("http://gateway.test".to_string())
            .with_credentials("tango-cs".to_string(), "tango".to_string());
        assert!(client.is_authenticated());

        let request = client
            .build_request(Method::GET, "/tango/rest/rc4")
            .build()
            .expect("Failed to build request");
        assert_eq!(request.url().as_str(), "http://gateway.test/tango/rest/rc4");
        assert!(request.headers().get("authorization").is_some());
    }

    #[tokio::test]
    async fn test_get_parses_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tango/rest/rc4/hosts/haso000/10000/devices/a/b/c/state"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"state": "ON"})))
            .mount(&server)
            .await;

        let client = test_client(server.uri());
        let reply: Value = client
            .get("/tango/rest/rc4/hosts/haso000/10000/devices/a/b/c/state")
            .await
            .expect("state reply");
        assert_eq!(reply["state"], "ON");
    }

    #[tokio::test]
    async fn test_error_statuses_are_mapped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/secret"))
            .and(header_exists("user-agent"))
            .respond_with(ResponseTemplate::new(401).set_body_string("no"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "errors": [{"reason": "API_CorbaException", "description": "boom"}]
            })))
            .expect(2)
            .mount(&server)
            .await;

        let client = test_client(server.uri());

        let result: Result<Value, _> = client.get("/missing").await;
        assert!(matches!(result, Err(DeviceError::NotFound { .. })));

        let result: Result<Value, _> = client.get("/secret").await;
        assert!(matches!(result, Err(DeviceError::Unauthorized { .. })));

        let result: Result<Value, _> = client.get("/broken").await;
        match result {
            Err(DeviceError::Http {
                status, message, ..
            }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "API_CorbaException: boom");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
