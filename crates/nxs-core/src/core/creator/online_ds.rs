//! TANGO datasources from the beamline `online.xml` description.

use crate::core::creator::{DataSourceSink, store_all};
use crate::core::xml::DataSourceDef;
use crate::error::CreatorError;
use crate::tango::TangoHost;
use crate::utils::file::read_text;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::path::Path;

pub const DEFAULT_ONLINE_FILE: &str = "/online_dir/online.xml";

const TANGO_CONTROL: &str = "tango";

/// Attribute recorded for devices of a hardware module.
const MODULE_ATTRIBUTES: &[(&str, &str)] = &[
    ("absbox", "Position"),
    ("analyzerep01", "Position"),
    ("e6c", "Position"),
    ("galil_dmc", "Position"),
    ("kohzu", "Position"),
    ("motor_tango", "Position"),
    ("oms58", "Position"),
    ("pie710", "Position"),
    ("pie712", "Position"),
    ("smchydra", "Position"),
    ("spk", "Position"),
    ("tip551", "Position"),
    ("counter_tango", "Counts"),
    ("sis3820", "Counts"),
    ("vfcadc", "Counts"),
    ("tip830", "Value"),
    ("tip850adc", "Value"),
    ("tip850dac", "Voltage"),
    ("dgg2", "SampleTime"),
    ("mca_8701", "Data"),
    ("mca8715", "Data"),
    ("mca_sis3302", "Data"),
];

/// Fallback keyed by the device `type` when the module is unknown.
const TYPE_ATTRIBUTES: &[(&str, &str)] = &[
    ("stepping_motor", "Position"),
    ("counter", "Counts"),
    ("adc", "Value"),
    ("dac", "Voltage"),
    ("timer", "SampleTime"),
    ("mca", "Data"),
];

/// One `<device>` entry of `online.xml`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnlineDevice {
    pub name: String,
    pub device_type: String,
    pub module: String,
    pub device: String,
    pub control: String,
    pub hostname: String,
}

impl OnlineDevice {
    fn set(&mut self, field: &str, value: String) {
        match field {
            "name" => self.name = value,
            "type" => self.device_type = value,
            "module" => self.module = value,
            "device" => self.device = value,
            "control" => self.control = value,
            "hostname" => self.hostname = value,
            _ => {}
        }
    }

    /// Attribute to record, from the module table or the type table.
    pub fn attribute(&self) -> Option<&'static str> {
        let lookup = |table: &[(&str, &'static str)], key: &str| {
            table
                .iter()
                .find(|(entry, _)| entry.eq_ignore_ascii_case(key))
                .map(|(_, attribute)| *attribute)
        };
        lookup(MODULE_ATTRIBUTES, &self.module).or_else(|| lookup(TYPE_ATTRIBUTES, &self.device_type))
    }
}

/// Parse the `<hw><device>...</device></hw>` entries.
pub fn parse_online(xml: &str, source_name: &str) -> Result<Vec<OnlineDevice>, CreatorError> {
    let fail = |reason: String| CreatorError::Parse {
        source_name: source_name.to_string(),
        reason,
    };
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut path: Vec<String> = Vec::new();
    let mut current: Option<OnlineDevice> = None;
    let mut devices = Vec::new();

    loop {
        match reader.read_event().map_err(|e| fail(e.to_string()))? {
            Event::Start(element) => {
                let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
                if name == "device" && path.last().map(String::as_str) == Some("hw") {
                    current = Some(OnlineDevice::default());
                }
                path.push(name);
            }
            Event::End(_) => {
                let closed = path.pop();
                if closed.as_deref() == Some("device")
                    && path.last().map(String::as_str) == Some("hw")
                {
                    if let Some(device) = current.take() {
                        devices.push(device);
                    }
                }
            }
            Event::Text(text) => {
                let value = text.unescape().map_err(|e| fail(e.to_string()))?;
                if let (Some(device), [.., parent, field]) = (current.as_mut(), path.as_slice()) {
                    if parent == "device" {
                        device.set(field, value.trim().to_string());
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(devices)
}

/// Datasources for the tango-controlled devices; the rest is skipped.
///
/// Returns the datasources and the names of the skipped entries.
pub fn online_datasources(devices: &[OnlineDevice]) -> (Vec<DataSourceDef>, Vec<String>) {
    let mut datasources = Vec::new();
    let mut skipped = Vec::new();

    for device in devices {
        if !device.control.eq_ignore_ascii_case(TANGO_CONTROL) || device.device.is_empty() {
            log::debug!("Skipping {}: control '{}'", device.name, device.control);
            skipped.push(device.name.clone());
            continue;
        }
        let Some(attribute) = device.attribute() else {
            log::debug!(
                "Skipping {}: no attribute for module '{}'",
                device.name,
                device.module
            );
            skipped.push(device.name.clone());
            continue;
        };
        let host = match device.hostname.parse::<TangoHost>() {
            Ok(host) if !device.hostname.trim().is_empty() => host,
            _ => {
                log::debug!("Skipping {}: hostname '{}'", device.name, device.hostname);
                skipped.push(device.name.clone());
                continue;
            }
        };
        datasources.push(DataSourceDef::tango(
            &device.name,
            &device.device,
            &host,
            attribute,
        ));
    }
    (datasources, skipped)
}

/// `nxscreate onlineds`: read `path` and store the datasources it describes.
pub async fn create_online_datasources(
    sink: &dyn DataSourceSink,
    path: &Path,
) -> crate::Result<Vec<String>> {
    let xml = read_text(path)?;
    let devices = parse_online(&xml, &path.display().to_string())?;
    let (datasources, skipped) = online_datasources(&devices);
    if !skipped.is_empty() {
        log::debug!("Skipped {} entries: {}", skipped.len(), skipped.join(", "));
    }
    store_all(sink, &datasources).await
}
