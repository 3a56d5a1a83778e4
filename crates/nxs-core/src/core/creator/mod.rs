//! Datasource creators behind `nxscreate`.
//!
//! Creators build [`DataSourceDef`]s and hand them to a [`DataSourceSink`]:
//! either `.ds.xml` files in a directory or the Configuration Server.

pub mod device_ds;
pub mod online_ds;

use crate::core::services::config_server::ConfigServerService;
use crate::core::services::types::ItemKind;
use crate::core::xml::DataSourceDef;
use crate::utils::file::{ensure_directory_exists, write_text};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub const DATASOURCE_FILE_SUFFIX: &str = ".ds.xml";

#[async_trait]
pub trait DataSourceSink: Send + Sync {
    /// Returns `false` when an existing datasource was kept.
    async fn store(&self, datasource: &DataSourceDef) -> crate::Result<bool>;
}

/// Writes `<directory>/<prefix><name>.ds.xml`.
pub struct FileSink {
    directory: PathBuf,
    prefix: String,
    overwrite: bool,
}

impl FileSink {
    pub fn new(directory: &Path, prefix: &str, overwrite: bool) -> crate::Result<Self> {
        ensure_directory_exists(directory)?;
        Ok(Self {
            directory: directory.to_path_buf(),
            prefix: prefix.to_string(),
            overwrite,
        })
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.directory
            .join(format!("{}{}{}", self.prefix, name, DATASOURCE_FILE_SUFFIX))
    }
}

#[async_trait]
impl DataSourceSink for FileSink {
    async fn store(&self, datasource: &DataSourceDef) -> crate::Result<bool> {
        let xml = datasource.to_xml()?;
        Ok(write_text(
            self.path_for(&datasource.name),
            &xml,
            self.overwrite,
        )?)
    }
}

/// Stores datasources in the Configuration Server.
pub struct ConfigServerSink {
    service: ConfigServerService,
    existing: Vec<String>,
    overwrite: bool,
}

impl ConfigServerSink {
    pub async fn new(service: ConfigServerService, overwrite: bool) -> crate::Result<Self> {
        let existing = service.available(ItemKind::DataSource).await?;
        Ok(Self {
            service,
            existing,
            overwrite,
        })
    }
}

#[async_trait]
impl DataSourceSink for ConfigServerSink {
    async fn store(&self, datasource: &DataSourceDef) -> crate::Result<bool> {
        if !self.overwrite && self.existing.contains(&datasource.name) {
            log::debug!("Skipping stored datasource {}", datasource.name);
            return Ok(false);
        }
        let xml = datasource.to_xml()?;
        self.service
            .store(ItemKind::DataSource, &datasource.name, &xml)
            .await?;
        Ok(true)
    }
}

/// Hand every datasource to `sink`; returns the names actually stored.
pub async fn store_all(
    sink: &dyn DataSourceSink,
    datasources: &[DataSourceDef],
) -> crate::Result<Vec<String>> {
    let mut stored = Vec::new();
    for datasource in datasources {
        if sink.store(datasource).await? {
            stored.push(datasource.name.clone());
        } else {
            log::info!("{} exists, use --overwrite to replace it", datasource.name);
        }
    }
    Ok(stored)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::tango::TangoHost;
    use crate::tango::testing::{MockConnector, MockDevice};
    use crate::tango::DeviceName;
    use crate::utils::file::read_text;
    use crate::utils::retry::PollPolicy;
    use serde_json::{Value, json};
    use std::time::Duration;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_sink_keeps_existing_files() {
        let dir = TempDir::new().expect("temp dir");
        let sink = FileSink::new(&dir.path().join("dsdir"), "test_", false).unwrap();
        let first = DataSourceDef::client("exp_c01", "exp_c01");

        let stored = store_all(&sink, &[first.clone()]).await.unwrap();
        assert_eq!(stored, vec!["exp_c01".to_string()]);
        let path = dir.path().join("dsdir").join("test_exp_c01.ds.xml");
        assert!(read_text(&path).unwrap().contains("type=\"CLIENT\""));

        let replaced = DataSourceDef::tango(
            "exp_c01",
            "p09/counter/exp.01",
            &TangoHost::new("haso000", 10000),
            "Counts",
        );
        assert!(store_all(&sink, &[replaced.clone()]).await.unwrap().is_empty());

        let overwriting = FileSink::new(&dir.path().join("dsdir"), "test_", true).unwrap();
        assert_eq!(store_all(&overwriting, &[replaced]).await.unwrap().len(), 1);
        assert!(read_text(&path).unwrap().contains("type=\"TANGO\""));
    }

    #[tokio::test]
    async fn test_config_server_sink_skips_stored_names() {
        let server = "p09/nxsconfigserver/haso000";
        let connector = MockConnector::new().with_device(
            MockDevice::new(server)
                .with_reply("Open", Value::Null)
                .with_reply("AvailableDataSources", json!(["exp_c01"]))
                .with_reply("StoreDataSource", Value::Null),
        );
        let service = ConfigServerService::open(
            &connector,
            &DeviceName::new(server),
            &PollPolicy::new(2, Duration::from_millis(1)),
        )
        .await
        .unwrap();
        let sink = ConfigServerSink::new(service, false).await.unwrap();

        let stored = store_all(
            &sink,
            &[
                DataSourceDef::client("exp_c01", "exp_c01"),
                DataSourceDef::client("exp_c02", "exp_c02"),
            ],
        )
        .await
        .unwrap();
        assert_eq!(stored, vec!["exp_c02".to_string()]);

        let device = connector.device(server);
        let calls = device.calls();
        let (_, stored_name) = calls.last().unwrap();
        assert_eq!(stored_name, &json!("exp_c02"));
        assert!(
            device
                .attribute("XMLString")
                .and_then(|xml| xml.as_str().map(|s| s.contains("exp_c02")))
                .unwrap_or(false)
        );
    }
}
