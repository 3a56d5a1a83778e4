//! TANGO and CLIENT datasources from device names and index ranges.

use crate::core::creator::{DataSourceSink, store_all};
use crate::core::device_tools::{generate_device_names, get_attributes, get_server_tango_host};
use crate::core::xml::DataSourceDef;
use crate::error::CliError;
use crate::tango::device::DeviceConnector;
use crate::tango::{DeviceName, TangoHost};

pub const DEFAULT_ATTRIBUTE: &str = "Position";

/// `nxscreate tangods`: one datasource per index of a device range.
#[derive(Debug, Clone)]
pub struct TangoRange {
    pub first: u32,
    pub last: u32,
    pub datasource_prefix: String,
    pub device_prefix: String,
    pub attribute: String,
    pub host: TangoHost,
}

impl TangoRange {
    pub fn datasources(&self) -> crate::Result<Vec<DataSourceDef>> {
        let names = generate_device_names(&self.datasource_prefix, self.first, self.last)?;
        let devices = generate_device_names(&self.device_prefix, self.first, self.last)?;
        Ok(names
            .iter()
            .zip(devices.iter())
            .map(|(name, device)| DataSourceDef::tango(name, device, &self.host, &self.attribute))
            .collect())
    }
}

pub async fn create_tango_datasources(
    sink: &dyn DataSourceSink,
    range: &TangoRange,
) -> crate::Result<Vec<String>> {
    store_all(sink, &range.datasources()?).await
}

/// Names for `nxscreate clientds`: explicit names, or a prefix with an index range.
pub fn client_names(
    names: &[String],
    prefix: Option<&str>,
    first: Option<u32>,
    last: Option<u32>,
) -> crate::Result<Vec<String>> {
    if !names.is_empty() {
        return Ok(names.to_vec());
    }
    match (prefix, first, last) {
        (Some(prefix), Some(first), Some(last)) => Ok(generate_device_names(prefix, first, last)?),
        _ => Err(CliError::InvalidArguments(
            "give datasource names or --device-prefix with --first and --last".to_string(),
        )
        .into()),
    }
}

/// CLIENT datasources recording under their own name.
pub async fn create_client_datasources(
    sink: &dyn DataSourceSink,
    names: &[String],
) -> crate::Result<Vec<String>> {
    let datasources: Vec<DataSourceDef> = names
        .iter()
        .map(|name| DataSourceDef::client(name, name))
        .collect();
    store_all(sink, &datasources).await
}

/// `nxscreate deviceds`: one datasource per attribute of a device.
///
/// Without attributes every attribute but `State` and `Status` is used.
pub async fn create_device_datasources(
    sink: &dyn DataSourceSink,
    connector: &dyn DeviceConnector,
    device: &DeviceName,
    datasource_prefix: &str,
    attributes: &[String],
) -> crate::Result<Vec<String>> {
    let attributes = if attributes.is_empty() {
        get_attributes(connector, device).await?
    } else {
        attributes.to_vec()
    };
    let host = get_server_tango_host(connector, device);
    let datasources: Vec<DataSourceDef> = attributes
        .iter()
        .map(|attribute| {
            DataSourceDef::tango(
                &format!("{}{}", datasource_prefix, attribute.to_lowercase()),
                &device.path,
                &host,
                attribute,
            )
        })
        .collect();
    store_all(sink, &datasources).await
}
