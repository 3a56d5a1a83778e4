//! Typed access to the Tango database device.

use crate::error::DeviceError;
use crate::tango::device::{Device, DeviceConnector, as_string, as_string_list};
use crate::tango::{DeviceName, TangoHost};
use crate::utils::error_helpers::bad_reply;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::Arc;

pub const DATABASE_DEVICE: &str = "sys/database/2";

/// Startup record of a server instance (`DbGetServerInfo`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    pub name: String,
    pub host: String,
    pub mode: i32,
    pub level: i32,
}

impl ServerInfo {
    fn from_reply(device: &str, reply: Vec<String>) -> Result<Self, DeviceError> {
        match reply.as_slice() {
            [name, host, mode, level, ..] => Ok(Self {
                name: name.clone(),
                host: host.clone(),
                mode: mode.trim().parse().unwrap_or(0),
                level: level.trim().parse().unwrap_or(0),
            }),
            _ => Err(bad_reply(device, "server info needs 4 fields")),
        }
    }

    fn to_input(&self) -> Value {
        json!([
            self.name,
            self.host,
            self.mode.to_string(),
            self.level.to_string()
        ])
    }
}

pub struct Database {
    device: Arc<dyn Device>,
}

impl Database {
    pub fn new(device: Arc<dyn Device>) -> Self {
        Self { device }
    }

    /// Database of the connector's default Tango host.
    pub fn connect(connector: &dyn DeviceConnector) -> Result<Self, DeviceError> {
        Ok(Self::new(
            connector.connect(&DeviceName::new(DATABASE_DEVICE))?,
        ))
    }

    /// Database of a given Tango host; the process environment is untouched.
    pub fn connect_to(
        connector: &dyn DeviceConnector,
        tango_host: &TangoHost,
    ) -> Result<Self, DeviceError> {
        if tango_host == connector.tango_host() {
            return Self::connect(connector);
        }
        Ok(Self::new(connector.connect(&DeviceName::on_host(
            tango_host.clone(),
            DATABASE_DEVICE,
        ))?))
    }

    async fn strings(&self, command: &str, input: Value) -> Result<Vec<String>, DeviceError> {
        let reply = self.device.command_inout(command, input).await?;
        as_string_list(self.device.name(), reply)
    }

    pub async fn get_device_exported_for_class(
        &self,
        class: &str,
    ) -> Result<Vec<String>, DeviceError> {
        self.strings("DbGetExportdDeviceListForClass", json!(class))
            .await
    }

    pub async fn get_server_list(&self, pattern: &str) -> Result<Vec<String>, DeviceError> {
        self.strings("DbGetServerList", json!(pattern)).await
    }

    /// `(device, class)` pairs served by a server instance.
    pub async fn get_device_class_list(
        &self,
        server: &str,
    ) -> Result<Vec<(String, String)>, DeviceError> {
        let flat = self.strings("DbGetDeviceClassList", json!(server)).await?;
        if flat.len() % 2 != 0 {
            return Err(bad_reply(
                self.device.name(),
                "device/class list has odd length",
            ));
        }
        Ok(flat
            .chunks(2)
            .map(|pair| (pair[0].clone(), pair[1].clone()))
            .collect())
    }

    /// Devices of `class` registered under `server` (`*` for any server).
    pub async fn get_device_list(
        &self,
        server: &str,
        class: &str,
    ) -> Result<Vec<String>, DeviceError> {
        self.strings("DbGetDeviceList", json!([server, class])).await
    }

    pub async fn get_class_for_device(&self, device: &str) -> Result<String, DeviceError> {
        let reply = self
            .device
            .command_inout("DbGetClassforDevice", json!(device))
            .await?;
        as_string(self.device.name(), reply)
    }

    pub async fn get_device_property(
        &self,
        device: &str,
        names: &[&str],
    ) -> Result<BTreeMap<String, Vec<String>>, DeviceError> {
        let mut input = vec![device.to_string()];
        input.extend(names.iter().map(|name| name.to_string()));
        let flat = self.strings("DbGetDeviceProperty", json!(input)).await?;
        parse_properties(self.device.name(), &flat)
    }

    pub async fn put_device_property(
        &self,
        device: &str,
        name: &str,
        values: &[String],
    ) -> Result<(), DeviceError> {
        let mut input = vec![
            device.to_string(),
            "1".to_string(),
            name.to_string(),
            values.len().to_string(),
        ];
        input.extend(values.iter().cloned());
        self.device
            .command_inout("DbPutDeviceProperty", json!(input))
            .await?;
        Ok(())
    }

    pub async fn delete_device_property(&self, device: &str, name: &str) -> Result<(), DeviceError> {
        self.device
            .command_inout("DbDeleteDeviceProperty", json!([device, name]))
            .await?;
        Ok(())
    }

    pub async fn get_server_info(&self, server: &str) -> Result<ServerInfo, DeviceError> {
        let reply = self.strings("DbGetServerInfo", json!(server)).await?;
        ServerInfo::from_reply(self.device.name(), reply)
    }

    pub async fn put_server_info(&self, info: &ServerInfo) -> Result<(), DeviceError> {
        self.device
            .command_inout("DbPutServerInfo", info.to_input())
            .await?;
        Ok(())
    }

    pub async fn add_device(&self, server: &str, device: &str, class: &str) -> Result<(), DeviceError> {
        self.device
            .command_inout("DbAddDevice", json!([server, device, class]))
            .await?;
        Ok(())
    }
}

/// Decode `[device, nprops, name, nvalues, values..., name, nvalues, ...]`.
///
/// Properties that do not exist come back with zero values and are left out.
fn parse_properties(
    device: &str,
    flat: &[String],
) -> Result<BTreeMap<String, Vec<String>>, DeviceError> {
    let mut properties = BTreeMap::new();
    if flat.len() < 2 {
        return Ok(properties);
    }
    let count: usize = flat[1]
        .trim()
        .parse()
        .map_err(|_| bad_reply(device, "invalid property count"))?;

    let mut pos = 2;
    for _ in 0..count {
        let name = flat
            .get(pos)
            .ok_or_else(|| bad_reply(device, "truncated property list"))?;
        let nvalues: usize = flat
            .get(pos + 1)
            .and_then(|n| n.trim().parse().ok())
            .ok_or_else(|| bad_reply(device, "invalid property value count"))?;
        let values = flat
            .get(pos + 2..pos + 2 + nvalues)
            .ok_or_else(|| bad_reply(device, "truncated property values"))?;
        // a missing property is reported as a single blank value
        let missing = nvalues == 0 || (nvalues == 1 && values[0].trim().is_empty());
        if !missing {
            properties.insert(name.clone(), values.to_vec());
        }
        pos += 2 + nvalues;
    }
    Ok(properties)
}
