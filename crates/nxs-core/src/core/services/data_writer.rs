//! Client side of the NXSDataWriter device.

use crate::core::device_tools::{open_server, wait_while_running};
use crate::error::WriterError;
use crate::tango::DeviceName;
use crate::tango::device::{Device, DeviceConnector};
use crate::utils::file::read_text;
use crate::utils::retry::PollPolicy;
use crate::utils::validation::validate_json;
use serde_json::{Value, json};
use std::path::Path;
use std::sync::Arc;

pub const DATA_WRITER_CLASS: &str = "NXSDataWriter";

const EMPTY_RECORD: &str = "{}";

pub struct DataWriterService {
    device: Arc<dyn Device>,
    policy: PollPolicy,
}

impl DataWriterService {
    pub fn new(device: Arc<dyn Device>, policy: PollPolicy) -> Self {
        Self { device, policy }
    }

    pub async fn open(
        connector: &dyn DeviceConnector,
        device: &DeviceName,
        policy: PollPolicy,
    ) -> crate::Result<Self> {
        let device = open_server(connector, device, &policy).await?;
        Ok(Self::new(device, policy))
    }

    pub fn name(&self) -> &str {
        self.device.name()
    }

    /// Run a state-changing command and wait for the writer to settle.
    async fn command(&self, command: &str, input: Value) -> crate::Result<()> {
        log::debug!("{}: {}", self.device.name(), command);
        self.device.command_inout(command, input).await?;
        wait_while_running(&self.device, &self.policy).await?;
        Ok(())
    }

    pub async fn open_file(&self, file_name: &str) -> crate::Result<()> {
        if file_name.trim().is_empty() {
            return Err(WriterError::MissingArgument {
                command: "openfile".to_string(),
                argument: "file name".to_string(),
            }
            .into());
        }
        self.command("Init", Value::Null).await?;
        self.device
            .write_attribute("FileName", json!(file_name))
            .await?;
        self.command("OpenFile", Value::Null).await
    }

    /// Global data for the next `OpenEntry`/`Record`.
    pub async fn set_data(&self, data: &str) -> crate::Result<()> {
        check_json(data)?;
        self.device
            .write_attribute("JSONRecord", json!(data))
            .await?;
        Ok(())
    }

    /// Open an entry, first loading the XML settings file when one is given.
    pub async fn open_entry(&self, xml_settings: Option<&Path>) -> crate::Result<()> {
        if let Some(path) = xml_settings {
            let xml = read_text(path).map_err(|e| WriterError::XmlSettings {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
            self.device
                .write_attribute("XMLSettings", json!(xml))
                .await?;
        }
        self.command("OpenEntry", Value::Null).await
    }

    pub async fn record(&self, data: Option<&str>) -> crate::Result<()> {
        let data = data.unwrap_or(EMPTY_RECORD);
        check_json(data)?;
        self.command("Record", json!(data)).await
    }

    pub async fn close_entry(&self) -> crate::Result<()> {
        self.command("CloseEntry", Value::Null).await
    }

    pub async fn close_file(&self) -> crate::Result<()> {
        self.command("CloseFile", Value::Null).await
    }
}

fn check_json(data: &str) -> Result<(), WriterError> {
    validate_json(data)
        .map(|_| ())
        .map_err(|e| WriterError::InvalidJson {
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, DeviceError};
    use crate::tango::DevState;
    use crate::tango::testing::{MockConnector, MockDevice};
    use std::time::Duration;
    use tempfile::TempDir;

    const WRITER: &str = "p09/nxsdatawriter/haso000";

    fn writer_device() -> MockDevice {
        let mut device = MockDevice::new(WRITER);
        for command in [
            "Init",
            "OpenFile",
            "OpenEntry",
            "Record",
            "CloseEntry",
            "CloseFile",
        ] {
            device = device.with_reply(command, Value::Null);
        }
        device
    }

    async fn open(device: MockDevice) -> (MockConnector, DataWriterService) {
        let connector = MockConnector::new().with_device(device);
        let service = DataWriterService::open(
            &connector,
            &DeviceName::new(WRITER),
            PollPolicy::new(5, Duration::from_millis(1)),
        )
        .await
        .expect("writer opened");
        (connector, service)
    }

    #[tokio::test]
    async fn test_full_writing_sequence() {
        let dir = TempDir::new().expect("temp dir");
        let settings = dir.path().join("scan.xml");
        std::fs::write(&settings, "<definition/>").unwrap();

        let (connector, service) = open(writer_device()).await;
        service.open_file("/tmp/scan_001.nxs").await.unwrap();
        service.set_data("{\"data\": {\"title\": \"scan\"}}").await.unwrap();
        service.open_entry(Some(settings.as_path())).await.unwrap();
        service.record(Some("{\"data\": {\"exp_c01\": 3}}")).await.unwrap();
        service.record(None).await.unwrap();
        service.close_entry().await.unwrap();
        service.close_file().await.unwrap();

        let device = connector.device(WRITER);
        assert_eq!(
            device.call_names(),
            vec![
                "Init",
                "write:FileName",
                "OpenFile",
                "write:JSONRecord",
                "write:XMLSettings",
                "OpenEntry",
                "Record",
                "Record",
                "CloseEntry",
                "CloseFile",
            ]
        );
        assert_eq!(device.attribute("FileName"), Some(json!("/tmp/scan_001.nxs")));
        assert_eq!(device.attribute("XMLSettings"), Some(json!("<definition/>")));
        assert_eq!(device.calls()[7].1, json!("{}"));
    }

    #[tokio::test]
    async fn test_invalid_json_is_not_sent() {
        let (connector, service) = open(writer_device()).await;

        let result = service.set_data("{not json").await;
        assert!(matches!(
            result,
            Err(AppError::Writer(WriterError::InvalidJson { .. }))
        ));
        let result = service.record(Some("[1, 2")).await;
        assert!(matches!(
            result,
            Err(AppError::Writer(WriterError::InvalidJson { .. }))
        ));
        assert!(connector.device(WRITER).calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_settings_file() {
        let (_connector, service) = open(writer_device()).await;
        let result = service
            .open_entry(Some(Path::new("/nonexistent/settings.xml")))
            .await;
        assert!(matches!(
            result,
            Err(AppError::Writer(WriterError::XmlSettings { .. }))
        ));
        assert!(service.open_file(" ").await.is_err());
    }

    #[tokio::test]
    async fn test_writer_stuck_in_running() {
        let connector = MockConnector::new()
            .with_device(writer_device().with_states(&[DevState::On, DevState::Running]));
        let service = DataWriterService::open(
            &connector,
            &DeviceName::new(WRITER),
            PollPolicy::new(3, Duration::from_millis(1)),
        )
        .await
        .expect("first state is ON");

        let result = service.close_file().await;
        assert!(matches!(
            result,
            Err(AppError::Device(DeviceError::Unreachable { .. }))
        ));
        assert_eq!(connector.device(WRITER).call_names(), vec!["CloseFile"]);
    }
}
