//! Client side of the NXSConfigServer device.

use crate::core::device_tools::open_server;
use crate::core::services::types::{DataSourceRow, ItemKind};
use crate::core::xml::{parse_datasources, record_names};
use crate::error::{CliError, ConfigServerError, DeviceError};
use crate::tango::DeviceName;
use crate::tango::device::{Device, DeviceConnector, as_string, as_string_list};
use crate::utils::file::read_text;
use crate::utils::retry::PollPolicy;
use crate::utils::validation::validate_json;
use serde_json::{Value, json};
use std::path::Path;
use std::sync::Arc;

pub const CONFIG_SERVER_CLASS: &str = "NXSConfigServer";

const PRIVATE_PREFIX: &str = "__";

pub struct ConfigServerService {
    device: Arc<dyn Device>,
}

impl ConfigServerService {
    pub fn new(device: Arc<dyn Device>) -> Self {
        Self { device }
    }

    /// Wait for the server to be ready and open its database connection.
    pub async fn open(
        connector: &dyn DeviceConnector,
        device: &DeviceName,
        policy: &PollPolicy,
    ) -> crate::Result<Self> {
        let device = open_server(connector, device, policy).await?;
        device.command_inout("Open", Value::Null).await?;
        log::debug!("Opened configuration server {}", device.name());
        Ok(Self::new(device))
    }

    pub fn name(&self) -> &str {
        self.device.name()
    }

    async fn strings(&self, command: &str, input: Value) -> Result<Vec<String>, DeviceError> {
        let reply = self.device.command_inout(command, input).await?;
        as_string_list(self.device.name(), reply)
    }

    async fn string(&self, command: &str, input: Value) -> Result<String, DeviceError> {
        let reply = self.device.command_inout(command, input).await?;
        as_string(self.device.name(), reply)
    }

    pub async fn available(&self, kind: ItemKind) -> crate::Result<Vec<String>> {
        Ok(self.strings(kind.available_command(), Value::Null).await?)
    }

    pub async fn mandatory_components(&self) -> crate::Result<Vec<String>> {
        Ok(self.strings("MandatoryComponents", Value::Null).await?)
    }

    /// Abort unless every name is stored; lists all missing names at once.
    async fn check_names(&self, kind: ItemKind, names: &[String]) -> crate::Result<()> {
        if names.is_empty() {
            return Ok(());
        }
        let available = self.available(kind).await?;
        let missing: Vec<String> = names
            .iter()
            .filter(|name| !available.contains(name))
            .cloned()
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigServerError::NotStored {
                kind: kind.to_string(),
                names: missing,
            }
            .into())
        }
    }

    /// `names` preceded by the mandatory components it does not already hold.
    async fn with_mandatory(&self, names: &[String], mandatory: bool) -> crate::Result<Vec<String>> {
        if !mandatory {
            return Ok(names.to_vec());
        }
        let mut all: Vec<String> = self
            .mandatory_components()
            .await?
            .into_iter()
            .filter(|name| !names.contains(name))
            .collect();
        all.extend(names.iter().cloned());
        Ok(all)
    }

    pub async fn list(
        &self,
        kind: ItemKind,
        mandatory: bool,
        private: bool,
    ) -> crate::Result<Vec<String>> {
        let names = if kind == ItemKind::Component && mandatory {
            self.mandatory_components().await?
        } else {
            self.available(kind).await?
        };
        if private || kind != ItemKind::Component {
            return Ok(names);
        }
        Ok(names
            .into_iter()
            .filter(|name| !name.starts_with(PRIVATE_PREFIX))
            .collect())
    }

    /// Stored documents of the given names.
    pub async fn show(
        &self,
        kind: ItemKind,
        names: &[String],
        mandatory: bool,
    ) -> crate::Result<Vec<String>> {
        require_names("show", names)?;
        self.check_names(kind, names).await?;
        let names = if kind == ItemKind::Component {
            self.with_mandatory(names, mandatory).await?
        } else {
            names.to_vec()
        };
        Ok(self.strings(kind.fetch_command(), json!(names)).await?)
    }

    /// Final configuration built from the given components.
    pub async fn get(&self, names: &[String], mandatory: bool) -> crate::Result<String> {
        require_names("get", names)?;
        self.check_names(ItemKind::Component, names).await?;
        let names = self.with_mandatory(names, mandatory).await?;
        self.device
            .command_inout("CreateConfiguration", json!(names))
            .await?;
        let xml = self.device.read_attribute("XMLString").await?;
        Ok(as_string(self.device.name(), xml)?)
    }

    pub async fn merge(&self, names: &[String], mandatory: bool) -> crate::Result<String> {
        require_names("merge", names)?;
        self.check_names(ItemKind::Component, names).await?;
        let names = self.with_mandatory(names, mandatory).await?;
        Ok(self.string("Merge", json!(names)).await?)
    }

    /// Delete the named documents, asking `confirm` for each one.
    ///
    /// Returns the names actually deleted.
    pub async fn delete<F>(
        &self,
        kind: ItemKind,
        names: &[String],
        mut confirm: F,
    ) -> crate::Result<Vec<String>>
    where
        F: FnMut(&str) -> crate::Result<bool>,
    {
        require_names("delete", names)?;
        self.check_names(kind, names).await?;

        let mut deleted = Vec::new();
        for name in names {
            if !confirm(&format!("Remove {} '{}'?", kind, name))? {
                log::info!("Keeping {} '{}'", kind, name);
                continue;
            }
            self.device
                .command_inout(kind.delete_command(), json!(name))
                .await?;
            deleted.push(name.clone());
        }
        Ok(deleted)
    }

    /// Store documents read from `directory`.
    ///
    /// Without names every file of the matching kind is uploaded. All files
    /// are read before the first store.
    pub async fn upload(
        &self,
        kind: ItemKind,
        directory: &Path,
        names: &[String],
    ) -> crate::Result<Vec<String>> {
        let names = if names.is_empty() {
            names_in_directory(kind, directory)?
        } else {
            names.to_vec()
        };
        require_names("upload", &names)?;

        let mut documents = Vec::with_capacity(names.len());
        for name in &names {
            let path = directory.join(format!("{}{}", name, kind.file_suffix()));
            let content = read_text(&path).map_err(|e| ConfigServerError::UploadFile {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
            documents.push((name.clone(), content));
        }

        for (name, content) in &documents {
            self.store(kind, name, content).await?;
        }
        Ok(names)
    }

    /// Store one document under `name`, replacing any stored one.
    pub async fn store(&self, kind: ItemKind, name: &str, document: &str) -> crate::Result<()> {
        log::debug!("Storing {} '{}'", kind, name);
        self.device
            .write_attribute(kind.document_attribute(), json!(document))
            .await?;
        self.device
            .command_inout(kind.store_command(), json!(name))
            .await?;
        Ok(())
    }

    /// Datasources used by the given components, or by all of them.
    pub async fn sources(&self, names: &[String], mandatory: bool) -> crate::Result<Vec<String>> {
        self.check_names(ItemKind::Component, names).await?;
        let names = self.with_mandatory(names, mandatory).await?;
        let sources = match names.as_slice() {
            [single] => self.strings("ComponentDataSources", json!(single)).await?,
            _ => self.strings("ComponentsDataSources", json!(names)).await?,
        };
        Ok(sources)
    }

    /// Components the given components depend on.
    pub async fn components(&self, names: &[String]) -> crate::Result<Vec<String>> {
        self.check_names(ItemKind::Component, names).await?;
        Ok(self.strings("DependentComponents", json!(names)).await?)
    }

    pub async fn variables(&self, names: &[String], mandatory: bool) -> crate::Result<Vec<String>> {
        self.check_names(ItemKind::Component, names).await?;
        let names = self.with_mandatory(names, mandatory).await?;
        let variables = match names.as_slice() {
            [single] => self.strings("ComponentVariables", json!(single)).await?,
            _ => self.strings("ComponentsVariables", json!(names)).await?,
        };
        Ok(variables)
    }

    /// Optionally replace the `Variables` JSON, then return its current value.
    pub async fn data(&self, value: Option<&str>) -> crate::Result<String> {
        if let Some(value) = value {
            validate_json(value)?;
            self.device
                .write_attribute("Variables", json!(value))
                .await?;
        }
        let current = self.device.read_attribute("Variables").await?;
        Ok(as_string(self.device.name(), current)?)
    }

    /// Record names a component or datasource writes.
    pub async fn records(&self, kind: ItemKind, name: &str) -> crate::Result<Vec<String>> {
        reject_profiles("record", kind)?;
        let names = vec![name.to_string()];
        self.check_names(kind, &names).await?;

        let mut documents = Vec::new();
        match kind {
            ItemKind::DataSource => {
                documents.extend(self.strings("DataSources", json!(names)).await?);
            }
            _ => {
                documents.extend(
                    self.strings("InstantiatedComponents", json!(names))
                        .await?,
                );
                let sources = self.strings("ComponentDataSources", json!(name)).await?;
                if !sources.is_empty() {
                    documents.extend(self.strings("DataSources", json!(sources)).await?);
                }
            }
        }

        let mut records: Vec<String> = Vec::new();
        for document in &documents {
            for record in record_names(document, name)? {
                if !records.contains(&record) {
                    records.push(record);
                }
            }
        }
        Ok(records)
    }

    /// Datasource rows of the given items, or of every stored one.
    pub async fn describe(
        &self,
        kind: ItemKind,
        names: &[String],
    ) -> crate::Result<Vec<DataSourceRow>> {
        reject_profiles("describe", kind)?;
        let names = if names.is_empty() {
            self.list(kind, false, false).await?
        } else {
            self.check_names(kind, names).await?;
            names.to_vec()
        };

        let mut rows = Vec::new();
        match kind {
            ItemKind::DataSource => {
                if names.is_empty() {
                    return Ok(rows);
                }
                for document in self.strings("DataSources", json!(names)).await? {
                    rows.extend(rows_from_document("", &document)?);
                }
            }
            _ => {
                for component in &names {
                    let mut component_rows = Vec::new();
                    let sources = self
                        .strings("ComponentDataSources", json!(component))
                        .await?;
                    if !sources.is_empty() {
                        for document in self.strings("DataSources", json!(sources)).await? {
                            component_rows.extend(rows_from_document(component, &document)?);
                        }
                    }
                    for document in self
                        .strings("InstantiatedComponents", json!([component]))
                        .await?
                    {
                        for row in rows_from_document(component, &document)? {
                            let known = component_rows
                                .iter()
                                .any(|r: &DataSourceRow| r.datasource == row.datasource);
                            if !known && !row.datasource.is_empty() {
                                component_rows.push(row);
                            }
                        }
                    }
                    rows.extend(component_rows);
                }
            }
        }
        Ok(rows)
    }
}

/// Profiles hold no datasources of their own.
fn reject_profiles(command: &str, kind: ItemKind) -> crate::Result<()> {
    if kind == ItemKind::Profile {
        return Err(CliError::InvalidArguments(format!(
            "'{}' works on components and datasources, not profiles",
            command
        ))
        .into());
    }
    Ok(())
}

fn require_names(command: &str, names: &[String]) -> crate::Result<()> {
    if names.is_empty() {
        return Err(ConfigServerError::MissingNames {
            command: command.to_string(),
        }
        .into());
    }
    Ok(())
}

fn rows_from_document(component: &str, document: &str) -> crate::Result<Vec<DataSourceRow>> {
    Ok(parse_datasources(document, component)?
        .into_iter()
        .map(|def| DataSourceRow {
            component: component.to_string(),
            datasource: def.name,
            source_type: def.source_type,
            record: def.record.unwrap_or_default(),
        })
        .collect())
}

/// Names of the `kind` documents stored as files in `directory`, sorted.
fn names_in_directory(kind: ItemKind, directory: &Path) -> crate::Result<Vec<String>> {
    let entries = std::fs::read_dir(directory).map_err(|e| ConfigServerError::UploadFile {
        path: directory.display().to_string(),
        reason: e.to_string(),
    })?;
    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| kind.name_from_file(&entry.file_name().to_string_lossy()))
        .collect();
    names.sort();
    Ok(names)
}
