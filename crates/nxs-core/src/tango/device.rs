//! Device seam: everything the tools do to a remote device goes through
//! [`Device`], and devices are opened through a [`DeviceConnector`].

use crate::error::DeviceError;
use crate::tango::client::TangoClient;
use crate::tango::models::{
    AttributeEntry, AttributeValue, CommandInput, CommandResult, DeviceStateReply,
};
use crate::tango::{DevState, DeviceName, TangoHost};
use crate::utils::error_helpers::bad_reply;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;

#[async_trait]
pub trait Device: Send + Sync {
    fn name(&self) -> &str;

    async fn command_inout(&self, command: &str, input: Value) -> Result<Value, DeviceError>;

    async fn read_attribute(&self, attribute: &str) -> Result<Value, DeviceError>;

    async fn write_attribute(&self, attribute: &str, value: Value) -> Result<(), DeviceError>;

    async fn state(&self) -> Result<DevState, DeviceError>;

    async fn attribute_list(&self) -> Result<Vec<String>, DeviceError>;
}

pub trait DeviceConnector: Send + Sync {
    /// Default Tango database for unqualified device names
    fn tango_host(&self) -> &TangoHost;

    fn connect(&self, device: &DeviceName) -> Result<Arc<dyn Device>, DeviceError>;
}

/// Interpret a reply as a list of strings (`DevVarStringArray`).
pub fn as_string_list(device: &str, value: Value) -> Result<Vec<String>, DeviceError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                other => Err(bad_reply(
                    device,
                    format!("expected a string item, got {}", other),
                )),
            })
            .collect(),
        Value::String(s) => Ok(vec![s]),
        other => Err(bad_reply(
            device,
            format!("expected a list of strings, got {}", other),
        )),
    }
}

/// Interpret a reply as a single string (`DevString`).
pub fn as_string(device: &str, value: Value) -> Result<String, DeviceError> {
    match value {
        Value::String(s) => Ok(s),
        Value::Null => Ok(String::new()),
        other => Err(bad_reply(
            device,
            format!("expected a string, got {}", other),
        )),
    }
}

/// A device reached through the REST gateway.
#[derive(Debug, Clone)]
pub struct RestDevice {
    client: TangoClient,
    device: DeviceName,
    display_name: String,
}

impl RestDevice {
    pub fn new(client: TangoClient, device: DeviceName) -> Self {
        let display_name = device.to_string();
        Self {
            client,
            device,
            display_name,
        }
    }

    fn endpoint(&self, suffix: &str) -> String {
        format!("{}{}", self.client.device_path(&self.device), suffix)
    }
}

#[async_trait]
impl Device for RestDevice {
    fn name(&self) -> &str {
        &self.display_name
    }

    async fn command_inout(&self, command: &str, input: Value) -> Result<Value, DeviceError> {
        let endpoint = self.endpoint(&format!("/commands/{}", command));
        log::debug!("{} -> {}({})", self.display_name, command, input);
        let request = self
            .client
            .build_request(Method::PUT, &endpoint)
            .json(&CommandInput { input: &input });
        let result: CommandResult = self.client.send(request, &endpoint).await?;
        Ok(result.output)
    }

    async fn read_attribute(&self, attribute: &str) -> Result<Value, DeviceError> {
        let endpoint = self.endpoint(&format!("/attributes/{}/value", attribute));
        let reply: AttributeValue = self.client.get(&endpoint).await?;
        if reply.quality.as_deref() == Some("ATTR_INVALID") {
            return Err(bad_reply(
                &self.display_name,
                format!("attribute {} has invalid quality", reply.name),
            ));
        }
        Ok(reply.value)
    }

    async fn write_attribute(&self, attribute: &str, value: Value) -> Result<(), DeviceError> {
        let endpoint = self.endpoint(&format!("/attributes/{}/value", attribute));
        let text = match &value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        log::debug!("{} -> {} = {}", self.display_name, attribute, text);
        let request = self
            .client
            .build_request(Method::PUT, &endpoint)
            .query(&[("v", text)]);
        let _: Value = self.client.send(request, &endpoint).await?;
        Ok(())
    }

    async fn state(&self) -> Result<DevState, DeviceError> {
        let endpoint = self.endpoint("/state");
        // state is polled by callers, so no retries here
        let reply: DeviceStateReply = self.client.get_once(&endpoint).await?;
        reply.state.parse().map_err(|_| {
            bad_reply(
                &self.display_name,
                format!("unknown state '{}'", reply.state),
            )
        })
    }

    async fn attribute_list(&self) -> Result<Vec<String>, DeviceError> {
        let endpoint = self.endpoint("/attributes");
        let entries: Vec<AttributeEntry> = self.client.get(&endpoint).await?;
        Ok(entries.into_iter().map(|entry| entry.name).collect())
    }
}

impl DeviceConnector for TangoClient {
    fn tango_host(&self) -> &TangoHost {
        &self.tango_host
    }

    fn connect(&self, device: &DeviceName) -> Result<Arc<dyn Device>, DeviceError> {
        Ok(Arc::new(RestDevice::new(self.clone(), device.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::retry::RetryConfig;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DEVICE_PATH: &str = "/tango/rest/rc4/hosts/haso000/10000/devices/p09/nxsconfigserver/haso000";

    fn device_for(server: &MockServer) -> RestDevice {
        let client = TangoClient::new(server.uri(), TangoHost::new("haso000", 10000))
            .expect("client creation failed")
            .with_retry(RetryConfig::none());
        RestDevice::new(
            client,
            "p09/nxsconfigserver/haso000".parse().expect("valid name"),
        )
    }

    #[test]
    fn test_as_string_list() {
        assert_eq!(
            as_string_list("d", json!(["a", "b"])).ok(),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(as_string_list("d", Value::Null).ok(), Some(vec![]));
        assert_eq!(
            as_string_list("d", json!("single")).ok(),
            Some(vec!["single".to_string()])
        );
        assert!(as_string_list("d", json!([1, 2])).is_err());
        assert!(as_string_list("d", json!({"a": 1})).is_err());
    }

    #[test]
    fn test_as_string() {
        assert_eq!(as_string("d", json!("x")).ok(), Some("x".to_string()));
        assert_eq!(as_string("d", Value::Null).ok(), Some(String::new()));
        assert!(as_string("d", json!(3)).is_err());
    }

    #[tokio::test]
    async fn test_command_inout_sends_input() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(format!("{}/commands/ComponentDataSources", DEVICE_PATH)))
            .and(body_json(json!({"input": "slit1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "ComponentDataSources",
                "output": ["sl1right", "sl1left"]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let device = device_for(&server);
        let output = device
            .command_inout("ComponentDataSources", json!("slit1"))
            .await
            .expect("command reply");
        assert_eq!(output, json!(["sl1right", "sl1left"]));
    }

    #[tokio::test]
    async fn test_read_and_write_attribute() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/attributes/XMLString/value", DEVICE_PATH)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "XMLString",
                "value": "<definition/>",
                "quality": "ATTR_VALID",
                "timestamp": 1
            })))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(format!("{}/attributes/Variables/value", DEVICE_PATH)))
            .and(query_param("v", "{\"entry\":1}"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "Variables",
                "value": "{\"entry\":1}"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let device = device_for(&server);
        let value = device
            .read_attribute("XMLString")
            .await
            .expect("attribute value");
        assert_eq!(value, json!("<definition/>"));

        device
            .write_attribute("Variables", json!("{\"entry\":1}"))
            .await
            .expect("attribute written");
    }

    #[tokio::test]
    async fn test_state_and_attribute_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/state", DEVICE_PATH)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"state": "RUNNING", "status": "busy"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{}/attributes", DEVICE_PATH)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"name": "XMLString"}, {"name": "State"}, {"name": "Status"}
            ])))
            .mount(&server)
            .await;

        let device = device_for(&server);
        assert_eq!(device.state().await.ok(), Some(DevState::Running));
        assert_eq!(
            device.attribute_list().await.ok(),
            Some(vec![
                "XMLString".to_string(),
                "State".to_string(),
                "Status".to_string()
            ])
        );
        assert_eq!(device.name(), "p09/nxsconfigserver/haso000");
    }

    #[tokio::test]
    async fn test_state_is_read_once_on_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/state", DEVICE_PATH)))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .expect(1)
            .mount(&server)
            .await;

        let client = TangoClient::new(server.uri(), TangoHost::new("haso000", 10000))
            .expect("client creation failed")
            .with_retry(RetryConfig {
                max_retries: 3,
                initial_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(2),
                multiplier: 1.0,
            });
        let device = RestDevice::new(
            client,
            "p09/nxsconfigserver/haso000".parse().expect("valid name"),
        );
        assert!(matches!(
            device.state().await,
            Err(DeviceError::Http { status: 503, .. })
        ));
    }
}
