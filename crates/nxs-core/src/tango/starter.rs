use crate::error::DeviceError;
use crate::tango::device::{Device, DeviceConnector, as_string_list};
use crate::tango::{DeviceName, TangoHost};
use serde_json::json;
use std::sync::Arc;

/// Starter admin device of one host (`tango/admin/<host>`).
pub struct Starter {
    device: Arc<dyn Device>,
}

impl Starter {
    pub fn new(device: Arc<dyn Device>) -> Self {
        Self { device }
    }

    pub fn device_name(host: &str) -> String {
        let short = host.split('.').next().unwrap_or(host);
        format!("tango/admin/{}", short)
    }

    pub fn connect(
        connector: &dyn DeviceConnector,
        tango_host: &TangoHost,
        host: &str,
    ) -> Result<Self, DeviceError> {
        let path = Self::device_name(host);
        let name = if tango_host == connector.tango_host() {
            DeviceName::new(path)
        } else {
            DeviceName::on_host(tango_host.clone(), path)
        };
        Ok(Self::new(connector.connect(&name)?))
    }

    pub fn name(&self) -> &str {
        self.device.name()
    }

    pub async fn start(&self, server: &str) -> Result<(), DeviceError> {
        self.device.command_inout("DevStart", json!(server)).await?;
        Ok(())
    }

    pub async fn stop(&self, server: &str) -> Result<(), DeviceError> {
        self.device.command_inout("DevStop", json!(server)).await?;
        Ok(())
    }

    /// Servers the Starter currently sees running.
    pub async fn running_servers(&self) -> Result<Vec<String>, DeviceError> {
        match self.device.read_attribute("RunningServers").await {
            Ok(value) => as_string_list(self.device.name(), value),
            Err(DeviceError::NotFound { .. }) => {
                let reply = self
                    .device
                    .command_inout("DevGetRunningServers", json!(true))
                    .await?;
                as_string_list(self.device.name(), reply)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn is_running(&self, server: &str) -> Result<bool, DeviceError> {
        Ok(self
            .running_servers()
            .await?
            .iter()
            .any(|running| running == server))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tango::testing::{MockConnector, MockDevice};
    use serde_json::Value;

    #[test]
    fn test_device_name_uses_short_host() {
        assert_eq!(Starter::device_name("haso000.desy.de"), "tango/admin/haso000");
        assert_eq!(Starter::device_name("haspp09"), "tango/admin/haspp09");
    }

    #[tokio::test]
    async fn test_running_servers_prefers_attribute() {
        let connector = MockConnector::new().with_device(
            MockDevice::new("tango/admin/haso000")
                .with_attribute("RunningServers", json!(["NXSDataWriter/haso000"])),
        );
        let host = connector.tango_host().clone();
        let starter = Starter::connect(&connector, &host, "haso000").expect("starter");

        assert!(starter.is_running("NXSDataWriter/haso000").await.unwrap());
        assert!(!starter.is_running("NXSConfigServer/haso000").await.unwrap());
    }

    #[tokio::test]
    async fn test_running_servers_falls_back_to_command() {
        let connector = MockConnector::new().with_device(
            MockDevice::new("tango/admin/haso000")
                .with_reply("DevGetRunningServers", json!(["MacroServer/haso000"]))
                .with_reply("DevStart", Value::Null),
        );
        let host = connector.tango_host().clone();
        let starter = Starter::connect(&connector, &host, "haso000").expect("starter");

        assert_eq!(
            starter.running_servers().await.unwrap(),
            vec!["MacroServer/haso000".to_string()]
        );
        starter.start("Pool/haso000").await.unwrap();

        let calls = connector.device("tango/admin/haso000").calls();
        assert_eq!(calls[0], ("DevGetRunningServers".to_string(), json!(true)));
        assert_eq!(calls[1], ("DevStart".to_string(), json!("Pool/haso000")));
    }
}
