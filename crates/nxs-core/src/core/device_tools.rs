//! Lookup and connect helpers shared by every tool.

use crate::error::{CreatorError, DeviceError};
use crate::tango::database::Database;
use crate::tango::device::{Device, DeviceConnector};
use crate::tango::{DevState, DeviceName, TangoHost};
use crate::utils::retry::{PollPolicy, poll_until};
use std::sync::Arc;

const HIDDEN_ATTRIBUTES: [&str; 2] = ["State", "Status"];

/// Connect to a device and wait until it answers with a state other than `RUNNING`.
pub async fn open_server(
    connector: &dyn DeviceConnector,
    device: &DeviceName,
    policy: &PollPolicy,
) -> Result<Arc<dyn Device>, DeviceError> {
    let proxy = connector.connect(device)?;
    wait_while_running(&proxy, policy).await?;
    Ok(proxy)
}

/// Poll a device until it is reachable and not `RUNNING`.
pub async fn wait_while_running(
    device: &Arc<dyn Device>,
    policy: &PollPolicy,
) -> Result<(), DeviceError> {
    let target = Arc::clone(device);
    let ready = poll_until(policy, move || {
        let target = Arc::clone(&target);
        async move {
            match target.state().await {
                Ok(state) => state != DevState::Running,
                Err(e) => {
                    log::debug!("{} not ready: {}", target.name(), e);
                    false
                }
            }
        }
    })
    .await;

    if ready {
        Ok(())
    } else {
        Err(DeviceError::Unreachable {
            device: device.name().to_string(),
        })
    }
}

/// Exported devices of `class`, on `tango_host` or the default database.
pub async fn list_servers(
    connector: &dyn DeviceConnector,
    tango_host: Option<&TangoHost>,
    class: &str,
) -> Result<Vec<String>, DeviceError> {
    let db = match tango_host {
        Some(host) => Database::connect_to(connector, host)?,
        None => Database::connect(connector)?,
    };
    db.get_device_exported_for_class(class).await
}

/// First exported device of `class` on the default database.
pub async fn check_server(
    connector: &dyn DeviceConnector,
    class: &str,
) -> Result<DeviceName, DeviceError> {
    let servers = list_servers(connector, None, class).await?;
    match servers.first() {
        Some(first) => {
            if servers.len() > 1 {
                log::info!("Several {} servers exported, using {}", class, first);
            }
            first.parse()
        }
        None => Err(DeviceError::NoServer {
            class: class.to_string(),
            tango_host: connector.tango_host().to_string(),
        }),
    }
}

/// Resolve the device given with `--server`, or look one up by class.
pub async fn find_server(
    connector: &dyn DeviceConnector,
    server: Option<&str>,
    class: &str,
) -> Result<DeviceName, DeviceError> {
    match server {
        Some(name) if !name.trim().is_empty() => name.parse(),
        _ => check_server(connector, class).await,
    }
}

/// Attribute names of a device without `State` and `Status`.
pub async fn get_attributes(
    connector: &dyn DeviceConnector,
    device: &DeviceName,
) -> Result<Vec<String>, DeviceError> {
    let proxy = connector.connect(device)?;
    let attributes = proxy.attribute_list().await?;
    Ok(attributes
        .into_iter()
        .filter(|name| !HIDDEN_ATTRIBUTES.contains(&name.as_str()))
        .collect())
}

/// Host and port a device is reached through.
pub fn get_server_tango_host(connector: &dyn DeviceConnector, device: &DeviceName) -> TangoHost {
    device.resolve_host(connector.tango_host()).clone()
}

/// `prefix` followed by a two-digit index for every index in `first..=last`.
pub fn generate_device_names(
    prefix: &str,
    first: u32,
    last: u32,
) -> Result<Vec<String>, CreatorError> {
    if first > last {
        return Err(CreatorError::InvalidRange { first, last });
    }
    Ok((first..=last)
        .map(|index| format!("{}{:02}", prefix, index))
        .collect())
}

/// Every registered device of a class.
pub async fn device_names_by_class(
    connector: &dyn DeviceConnector,
    class: &str,
) -> Result<Vec<String>, DeviceError> {
    Database::connect(connector)?
        .get_device_list("*", class)
        .await
}

pub async fn class_name(
    connector: &dyn DeviceConnector,
    device: &str,
) -> Result<String, DeviceError> {
    Database::connect(connector)?
        .get_class_for_device(device)
        .await
}

/// Registered server instances matching `pattern`, e.g. `NXSDataWriter/*`.
pub async fn server_list(
    connector: &dyn DeviceConnector,
    pattern: &str,
) -> Result<Vec<String>, DeviceError> {
    Database::connect(connector)?
        .get_server_list(pattern)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tango::database::DATABASE_DEVICE;
    use crate::tango::client::TangoClient;
    use crate::tango::testing::{MockConnector, MockDevice};
    use serde_json::json;
    use std::time::{Duration, Instant};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn quick_policy() -> PollPolicy {
        PollPolicy::new(5, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_open_server_waits_until_not_running() {
        let connector = MockConnector::new().with_device(
            MockDevice::new("p09/nxsdatawriter/haso000").with_states(&[
                DevState::Running,
                DevState::Running,
                DevState::On,
            ]),
        );
        let name: DeviceName = "p09/nxsdatawriter/haso000".parse().unwrap();

        let proxy = open_server(&connector, &name, &quick_policy())
            .await
            .expect("server opened");
        assert_eq!(proxy.name(), "p09/nxsdatawriter/haso000");
    }

    #[tokio::test]
    async fn test_open_server_gives_up() {
        let connector = MockConnector::new()
            .with_device(MockDevice::new("p09/nxsdatawriter/haso000").unreachable())
            .with_device(
                MockDevice::new("p09/nxsconfigserver/haso000").with_states(&[DevState::Running]),
            );

        let name: DeviceName = "p09/nxsdatawriter/haso000".parse().unwrap();
        let result = open_server(&connector, &name, &quick_policy()).await;
        assert!(matches!(result, Err(DeviceError::Unreachable { .. })));

        let name: DeviceName = "p09/nxsconfigserver/haso000".parse().unwrap();
        let result = open_server(&connector, &name, &quick_policy()).await;
        assert!(matches!(result, Err(DeviceError::Unreachable { .. })));
    }

    #[tokio::test]
    async fn test_open_server_is_bounded_on_a_hanging_gateway() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(
                "/tango/rest/rc4/hosts/haso000/10000/devices/p09/nxsdatawriter/haso000/state",
            ))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"state": "ON", "status": "ok"}))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;
        let client = TangoClient::new(server.uri(), TangoHost::new("haso000", 10000))
            .expect("client creation failed");
        let policy = PollPolicy::new(3, Duration::from_millis(10))
            .with_check_timeout(Duration::from_millis(100));
        let name: DeviceName = "p09/nxsdatawriter/haso000".parse().unwrap();

        let started = Instant::now();
        let result = open_server(&client, &name, &policy).await;
        assert!(matches!(result, Err(DeviceError::Unreachable { .. })));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_check_server_picks_first_exported() {
        let connector = MockConnector::new().with_device(
            MockDevice::new(DATABASE_DEVICE).with_reply(
                "DbGetExportdDeviceListForClass",
                json!(["p09/nxsconfigserver/haso000", "p09/nxsconfigserver/other"]),
            ),
        );
        let name = check_server(&connector, "NXSConfigServer")
            .await
            .expect("server found");
        assert_eq!(name.path, "p09/nxsconfigserver/haso000");

        let name = find_server(&connector, Some("a/b/c"), "NXSConfigServer")
            .await
            .expect("explicit server");
        assert_eq!(name.path, "a/b/c");
    }

    #[tokio::test]
    async fn test_check_server_without_exported_devices() {
        let connector = MockConnector::new().with_device(
            MockDevice::new(DATABASE_DEVICE)
                .with_reply("DbGetExportdDeviceListForClass", json!([])),
        );
        let result = check_server(&connector, "NXSDataWriter").await;
        match result {
            Err(DeviceError::NoServer { class, tango_host }) => {
                assert_eq!(class, "NXSDataWriter");
                assert_eq!(tango_host, "haso000:10000");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_list_servers_on_other_host() {
        let connector = MockConnector::new().with_device(
            MockDevice::new("haspp09:10000/sys/database/2").with_reply(
                "DbGetExportdDeviceListForClass",
                json!(["p09/nxsdatawriter/haspp09"]),
            ),
        );
        let host = TangoHost::new("haspp09", 10000);
        let servers = list_servers(&connector, Some(&host), "NXSDataWriter")
            .await
            .expect("servers");
        assert_eq!(servers, vec!["p09/nxsdatawriter/haspp09".to_string()]);
    }

    #[tokio::test]
    async fn test_get_attributes_hides_state_and_status() {
        let connector = MockConnector::new().with_device(
            MockDevice::new("motor/tm2/1")
                .with_attribute("Position", json!(1.5))
                .with_attribute("State", json!("ON"))
                .with_attribute("Status", json!("ok"))
                .with_attribute("Velocity", json!(100)),
        );
        let name: DeviceName = "motor/tm2/1".parse().unwrap();
        let attributes = get_attributes(&connector, &name).await.expect("attributes");
        assert_eq!(
            attributes,
            vec!["Position".to_string(), "Velocity".to_string()]
        );
    }

    #[test]
    fn test_generate_device_names() {
        assert_eq!(
            generate_device_names("exp_c", 1, 3).unwrap(),
            vec!["exp_c01", "exp_c02", "exp_c03"]
        );
        assert_eq!(
            generate_device_names("mot", 99, 100).unwrap(),
            vec!["mot99", "mot100"]
        );
        assert!(generate_device_names("x", 3, 1).is_err());
    }

    #[test]
    fn test_get_server_tango_host() {
        let connector = MockConnector::new();
        let name: DeviceName = "remote:20000/a/b/c".parse().unwrap();
        assert_eq!(
            get_server_tango_host(&connector, &name),
            TangoHost::new("remote", 20000)
        );
        let name: DeviceName = "a/b/c".parse().unwrap();
        assert_eq!(
            get_server_tango_host(&connector, &name),
            TangoHost::new("haso000", 10000)
        );
    }

    #[tokio::test]
    async fn test_database_lookups() {
        let connector = MockConnector::new().with_device(
            MockDevice::new(DATABASE_DEVICE)
                .with_reply("DbGetDeviceList", json!(["p09/door/haso000.01"]))
                .with_reply("DbGetClassforDevice", json!("Door"))
                .with_reply("DbGetServerList", json!(["NXSDataWriter/haso000"])),
        );
        assert_eq!(
            device_names_by_class(&connector, "Door").await.unwrap(),
            vec!["p09/door/haso000.01".to_string()]
        );
        assert_eq!(
            class_name(&connector, "p09/door/haso000.01").await.unwrap(),
            "Door"
        );
        assert_eq!(
            server_list(&connector, "NXSDataWriter/*").await.unwrap(),
            vec!["NXSDataWriter/haso000".to_string()]
        );

        let calls = connector.device(DATABASE_DEVICE).calls();
        assert_eq!(calls[0].1, json!(["*", "Door"]));
    }
}
