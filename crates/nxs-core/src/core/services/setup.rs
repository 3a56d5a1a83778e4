//! Registration, startup and property maintenance of the NXS servers.

use crate::core::device_tools::open_server;
use crate::core::services::config_server::CONFIG_SERVER_CLASS;
use crate::core::services::data_writer::DATA_WRITER_CLASS;
use crate::core::services::known_hosts;
use crate::error::{DeviceError, SetupError};
use crate::tango::DeviceName;
use crate::tango::database::Database;
use crate::tango::device::DeviceConnector;
use crate::tango::starter::Starter;
use crate::utils::retry::{PollPolicy, poll_until};
use crate::utils::validation::validate_json;
use serde_json::{Value, json};

pub const REC_SELECTOR_CLASS: &str = "NXSRecSelector";
pub const MACRO_SERVER_CLASS: &str = "MacroServer";
pub const DEFAULT_SERVER_CLASSES: [&str; 3] =
    [DATA_WRITER_CLASS, CONFIG_SERVER_CLASS, REC_SELECTOR_CLASS];

const DEFAULT_DBNAME: &str = "nxsconfig";
const DEFAULT_LEVEL: i32 = 1;
const DSERVER_CLASS: &str = "DServer";
const RECORDER_PATH: &str = "RecorderPath";

/// Values given on the `nxsetup set` command line.
#[derive(Debug, Clone, Default)]
pub struct SetOptions {
    pub beamline: Option<String>,
    pub masterhost: Option<String>,
    pub user: Option<String>,
    pub dbname: Option<String>,
}

/// Where and as whom the servers of one host get installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installation {
    pub host: String,
    pub beamline: String,
    pub masterhost: String,
    pub user: String,
    pub dbname: String,
}

impl Installation {
    /// Fill the options the command line left out from the known-hosts table.
    pub fn resolve(host: &str, options: &SetOptions) -> Result<Self, SetupError> {
        let known = known_hosts::lookup(host);
        let unknown = || SetupError::UnknownHost {
            host: host.to_string(),
        };

        let beamline = match (&options.beamline, known) {
            (Some(beamline), _) => beamline.clone(),
            (None, Some(known)) => known.beamline.to_string(),
            (None, None) => return Err(unknown()),
        };
        let user = match (&options.user, known) {
            (Some(user), _) => user.clone(),
            (None, Some(known)) => known.user.to_string(),
            (None, None) => return Err(unknown()),
        };
        let masterhost = options
            .masterhost
            .clone()
            .or_else(|| known.map(|k| k.masterhost.to_string()))
            .unwrap_or_else(|| host.to_string());
        let dbname = options
            .dbname
            .clone()
            .or_else(|| known.map(|k| k.dbname.to_string()))
            .unwrap_or_else(|| DEFAULT_DBNAME.to_string());

        Ok(Self {
            host: host.to_string(),
            beamline,
            masterhost,
            user,
            dbname,
        })
    }

    pub fn server_name(&self, class: &str) -> String {
        format!("{}/{}", class, self.host)
    }

    pub fn device_name(&self, class: &str) -> String {
        format!("{}/{}/{}", self.beamline, class.to_lowercase(), self.host)
    }

    /// `JSONSettings` of the configuration server.
    pub fn db_settings(&self) -> String {
        let db_host = if self.masterhost == self.host {
            "localhost"
        } else {
            self.masterhost.as_str()
        };
        json!({
            "host": db_host,
            "db": self.dbname,
            "use_unicode": true,
            "read_default_file": format!("/home/{}/.my.cnf", self.user),
        })
        .to_string()
    }
}

/// Short name of the machine the tools run on.
pub fn local_hostname() -> Result<String, SetupError> {
    let name = hostname::get()
        .map_err(|e| SetupError::Hostname {
            reason: e.to_string(),
        })?
        .into_string()
        .map_err(|_| SetupError::Hostname {
            reason: "hostname is not valid UTF-8".to_string(),
        })?;
    Ok(name.split('.').next().unwrap_or(&name).to_string())
}

pub struct SetupService<'a> {
    connector: &'a dyn DeviceConnector,
    db: Database,
    host: String,
    policy: PollPolicy,
}

impl<'a> SetupService<'a> {
    pub fn new(
        connector: &'a dyn DeviceConnector,
        host: String,
        policy: PollPolicy,
    ) -> crate::Result<Self> {
        Ok(Self {
            db: Database::connect(connector)?,
            connector,
            host,
            policy,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Register, start and configure the three NXS servers.
    ///
    /// Returns the servers that had to be started.
    pub async fn set(
        &self,
        installation: &Installation,
        cs_json: Option<&str>,
    ) -> crate::Result<Vec<String>> {
        let mut started = Vec::new();
        for class in DEFAULT_SERVER_CLASSES {
            let server = installation.server_name(class);
            let device = installation.device_name(class);
            self.register(class, &server, &device).await?;
            if self.start_server(&server, None).await? {
                started.push(server.clone());
            }
            match class {
                CONFIG_SERVER_CLASS => {
                    let settings = cs_json
                        .map(str::to_string)
                        .unwrap_or_else(|| installation.db_settings());
                    self.configure_config_server(&device, &settings).await?;
                }
                REC_SELECTOR_CLASS => {
                    self.configure_selector(&device, installation).await?;
                }
                _ => {}
            }
        }
        Ok(started)
    }

    /// Add the device unless the server already serves it.
    async fn register(&self, class: &str, server: &str, device: &str) -> crate::Result<bool> {
        let registered = self.db.get_device_list(server, class).await?;
        if registered.iter().any(|name| name.eq_ignore_ascii_case(device)) {
            log::debug!("{} already registered in {}", device, server);
            return Ok(false);
        }
        log::info!("Registering {} in {}", device, server);
        self.db.add_device(server, device, class).await?;
        Ok(true)
    }

    async fn configure_config_server(&self, device: &str, settings: &str) -> crate::Result<()> {
        validate_json(settings)?;
        let proxy = open_server(self.connector, &DeviceName::new(device), &self.policy).await?;
        proxy
            .write_attribute("JSONSettings", json!(settings))
            .await?;
        proxy.command_inout("Open", Value::Null).await?;
        Ok(())
    }

    async fn configure_selector(
        &self,
        device: &str,
        installation: &Installation,
    ) -> crate::Result<()> {
        let proxy = open_server(self.connector, &DeviceName::new(device), &self.policy).await?;
        proxy
            .write_attribute(
                "ConfigDevice",
                json!(installation.device_name(CONFIG_SERVER_CLASS)),
            )
            .await?;
        proxy
            .write_attribute(
                "WriterDevice",
                json!(installation.device_name(DATA_WRITER_CLASS)),
            )
            .await?;
        Ok(())
    }

    /// Expand class names to their registered instances.
    ///
    /// Without names the NXS classes are used and classes without instances
    /// are skipped; an explicit class without instances is an error.
    pub async fn resolve_servers(&self, names: &[String]) -> crate::Result<Vec<String>> {
        let (names, strict): (Vec<String>, bool) = if names.is_empty() {
            (
                DEFAULT_SERVER_CLASSES
                    .iter()
                    .map(|class| class.to_string())
                    .collect(),
                false,
            )
        } else {
            (names.to_vec(), true)
        };

        let mut servers = Vec::new();
        for name in &names {
            if name.contains('/') {
                servers.push(name.clone());
                continue;
            }
            let instances = self.db.get_server_list(&format!("{}/*", name)).await?;
            if instances.is_empty() {
                if strict {
                    return Err(SetupError::NoInstance {
                        server: name.clone(),
                    }
                    .into());
                }
                log::warn!("No registered instance of {}", name);
            }
            servers.extend(instances);
        }
        Ok(servers)
    }

    pub async fn start(&self, names: &[String], level: Option<i32>) -> crate::Result<Vec<String>> {
        let mut started = Vec::new();
        for server in self.resolve_servers(names).await? {
            if self.start_server(&server, level).await? {
                started.push(server);
            }
        }
        Ok(started)
    }

    pub async fn stop(&self, names: &[String]) -> crate::Result<Vec<String>> {
        let mut stopped = Vec::new();
        for server in self.resolve_servers(names).await? {
            if self.stop_server(&server).await? {
                stopped.push(server);
            }
        }
        Ok(stopped)
    }

    pub async fn restart(
        &self,
        names: &[String],
        level: Option<i32>,
    ) -> crate::Result<Vec<String>> {
        let servers = self.resolve_servers(names).await?;
        self.restart_servers(&servers, level).await?;
        Ok(servers)
    }

    async fn restart_servers(&self, servers: &[String], level: Option<i32>) -> crate::Result<()> {
        for server in servers {
            self.stop_server(server).await?;
            self.start_server(server, level).await?;
        }
        Ok(())
    }

    async fn starter_for(&self, host: &str) -> crate::Result<Starter> {
        let starter_host = if host.is_empty() { &self.host } else { host };
        Ok(Starter::connect(
            self.connector,
            self.connector.tango_host(),
            starter_host,
        )?)
    }

    /// Start one server through its Starter and wait for its devices.
    ///
    /// Returns `false` when the server was already running.
    async fn start_server(&self, server: &str, level: Option<i32>) -> crate::Result<bool> {
        let mut info = self.db.get_server_info(server).await?;
        if info.host.is_empty() || level.is_some() {
            if info.host.is_empty() {
                info.host = self.host.clone();
            }
            info.mode = 1;
            info.level = level.unwrap_or(if info.level > 0 {
                info.level
            } else {
                DEFAULT_LEVEL
            });
            self.db.put_server_info(&info).await?;
        }

        let starter = self.starter_for(&info.host).await?;
        if starter.is_running(server).await? {
            log::info!("{} is already running", server);
            return Ok(false);
        }

        log::info!("Starting {} via {}", server, starter.name());
        starter.start(server).await?;
        let starter = &starter;
        let running = poll_until(&self.policy, move || async move {
            starter.is_running(server).await.unwrap_or(false)
        })
        .await;
        if !running {
            return Err(SetupError::StartTimeout {
                server: server.to_string(),
            }
            .into());
        }

        for (device, class) in self.db.get_device_class_list(server).await? {
            if class == DSERVER_CLASS {
                continue;
            }
            match open_server(self.connector, &DeviceName::new(device.as_str()), &self.policy).await
            {
                Ok(_) => log::debug!("{} is ready", device),
                Err(DeviceError::Unreachable { .. }) => {
                    return Err(SetupError::StartTimeout {
                        server: server.to_string(),
                    }
                    .into());
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(true)
    }

    /// Returns `false` when the server was not running.
    async fn stop_server(&self, server: &str) -> crate::Result<bool> {
        let info = self.db.get_server_info(server).await?;
        let starter = self.starter_for(&info.host).await?;
        if !starter.is_running(server).await? {
            log::info!("{} is not running", server);
            return Ok(false);
        }

        log::info!("Stopping {} via {}", server, starter.name());
        starter.stop(server).await?;
        let starter = &starter;
        let stopped = poll_until(&self.policy, move || async move {
            matches!(starter.is_running(server).await, Ok(false))
        })
        .await;
        if !stopped {
            return Err(SetupError::StopTimeout {
                server: server.to_string(),
            }
            .into());
        }
        Ok(true)
    }

    async fn devices_of(&self, classes: &[String]) -> crate::Result<Vec<String>> {
        let mut devices = Vec::new();
        for class in classes {
            devices.extend(self.db.get_device_list("*", class).await?);
        }
        Ok(devices)
    }

    /// Server instances that serve any of `devices`.
    async fn servers_hosting(&self, devices: &[String]) -> crate::Result<Vec<String>> {
        let mut servers = Vec::new();
        for server in self.db.get_server_list("*").await? {
            let hosted = self.db.get_device_class_list(&server).await?;
            let hosts_any = hosted.iter().any(|(device, _)| {
                devices
                    .iter()
                    .any(|changed| changed.eq_ignore_ascii_case(device))
            });
            if hosts_any {
                servers.push(server);
            }
        }
        Ok(servers)
    }

    /// Restart the servers of the changed devices.
    ///
    /// Returns the restarted servers.
    async fn restart_unless(
        &self,
        postpone: bool,
        devices: &[String],
    ) -> crate::Result<Vec<String>> {
        if postpone {
            log::info!("Restart of the servers of {} postponed", devices.join(", "));
            return Ok(Vec::new());
        }
        let servers = self.servers_hosting(devices).await?;
        if servers.is_empty() {
            log::warn!("No registered server serves {}", devices.join(", "));
            return Ok(Vec::new());
        }
        self.restart_servers(&servers, None).await?;
        Ok(servers)
    }

    /// Rename a device property on every device of `classes`.
    ///
    /// Returns the devices that held the old property.
    pub async fn move_property(
        &self,
        new_name: &str,
        old_name: &str,
        classes: &[String],
        postpone: bool,
    ) -> crate::Result<Vec<String>> {
        let classes = classes_or_selector(classes);
        let mut changed = Vec::new();
        for device in self.devices_of(&classes).await? {
            let properties = self.db.get_device_property(&device, &[old_name]).await?;
            if let Some(values) = properties.get(old_name) {
                self.db
                    .put_device_property(&device, new_name, values)
                    .await?;
                self.db.delete_device_property(&device, old_name).await?;
                log::info!("{}: {} -> {}", device, old_name, new_name);
                changed.push(device);
            }
        }
        if !changed.is_empty() {
            self.restart_unless(postpone, &changed).await?;
        }
        Ok(changed)
    }

    /// Set a device property on every device of `classes`.
    pub async fn change_property(
        &self,
        name: &str,
        value: &str,
        classes: &[String],
        postpone: bool,
    ) -> crate::Result<Vec<String>> {
        let classes = classes_or_selector(classes);
        let devices = self.devices_of(&classes).await?;
        for device in &devices {
            self.db
                .put_device_property(device, name, &[value.to_string()])
                .await?;
            log::info!("{}: {} = {}", device, name, value);
        }
        if !devices.is_empty() {
            self.restart_unless(postpone, &devices).await?;
        }
        Ok(devices)
    }

    /// Append `path` to `RecorderPath` of every MacroServer that lacks it.
    pub async fn add_recorder_path(&self, path: &str, postpone: bool) -> crate::Result<Vec<String>> {
        let classes = vec![MACRO_SERVER_CLASS.to_string()];
        let mut changed = Vec::new();
        for device in self.devices_of(&classes).await? {
            let properties = self.db.get_device_property(&device, &[RECORDER_PATH]).await?;
            let mut paths = properties.get(RECORDER_PATH).cloned().unwrap_or_default();
            if paths.iter().any(|existing| existing == path) {
                log::debug!("{} already records to {}", device, path);
                continue;
            }
            paths.push(path.to_string());
            self.db
                .put_device_property(&device, RECORDER_PATH, &paths)
                .await?;
            changed.push(device);
        }
        if !changed.is_empty() {
            self.restart_unless(postpone, &changed).await?;
        }
        Ok(changed)
    }
}

fn classes_or_selector(classes: &[String]) -> Vec<String> {
    if classes.is_empty() {
        vec![REC_SELECTOR_CLASS.to_string()]
    } else {
        classes.to_vec()
    }
}
