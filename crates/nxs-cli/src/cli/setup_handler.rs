use crate::cli::common::{Context, print_items};
use crate::cli::setup_types::{SetArgs, SetupCommands};
use nxs_core::core::services::known_hosts::KNOWN_HOSTS;
use nxs_core::core::services::setup::local_hostname;
use nxs_core::core::services::{Installation, SetOptions, SetupService};
use nxs_core::display::{ProgressSpinner, TableDisplay};
use nxs_core::error::AppError;

#[derive(Default)]
pub struct SetupHandler;

impl SetupHandler {
    pub fn new() -> Self {
        Self
    }

    /// `set --list-hosts` needs neither the gateway nor the configuration.
    pub fn is_offline(command: &SetupCommands) -> bool {
        matches!(command, SetupCommands::Set(SetArgs { list_hosts: true, .. }))
    }

    pub fn list_hosts(&self) {
        println!("{}", TableDisplay::new().render_known_hosts(KNOWN_HOSTS));
    }

    pub async fn handle(&self, command: SetupCommands, context: &Context) -> Result<(), AppError> {
        let host = local_hostname()?;
        log::debug!("Local host {}", host);
        let service = SetupService::new(&context.client, host, context.poll_policy())?;

        match command {
            SetupCommands::Set(args) => {
                if args.list_hosts {
                    self.list_hosts();
                    return Ok(());
                }
                let options = SetOptions {
                    beamline: args.beamline,
                    masterhost: args.masterhost,
                    user: args.user,
                    dbname: args.dbname,
                };
                let installation = Installation::resolve(service.host(), &options)?;
                log::info!(
                    "Installing {} servers of {} for {}",
                    installation.beamline,
                    installation.host,
                    installation.user
                );
                let started = with_spinner("Setting up NXS servers", async {
                    service.set(&installation, args.csjson.as_deref()).await
                })
                .await?;
                print_items(&started, false);
            }
            SetupCommands::Start(args) => {
                let started = with_spinner("Starting servers", async {
                    service.start(&args.servers.servers, args.level).await
                })
                .await?;
                print_items(&started, false);
            }
            SetupCommands::Stop(args) => {
                let stopped = with_spinner("Stopping servers", async {
                    service.stop(&args.servers).await
                })
                .await?;
                print_items(&stopped, false);
            }
            SetupCommands::Restart(args) => {
                let restarted = with_spinner("Restarting servers", async {
                    service.restart(&args.servers.servers, args.level).await
                })
                .await?;
                print_items(&restarted, false);
            }
            SetupCommands::MoveProp(args) => {
                let changed = service
                    .move_property(&args.newname, &args.oldname, &args.servers, args.postpone)
                    .await?;
                print_items(&changed, false);
            }
            SetupCommands::ChangeProp(args) => {
                let changed = service
                    .change_property(&args.name, &args.value, &args.servers, args.postpone)
                    .await?;
                print_items(&changed, false);
            }
            SetupCommands::AddRecorderPath { path, postpone } => {
                let changed = service.add_recorder_path(&path, postpone).await?;
                print_items(&changed, false);
            }
        }
        Ok(())
    }
}

async fn with_spinner<T>(
    message: &str,
    operation: impl Future<Output = nxs_core::Result<T>>,
) -> nxs_core::Result<T> {
    let mut spinner = ProgressSpinner::new(format!("{}...", message));
    spinner.start();
    let result = operation.await;
    spinner.stop(None);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::setup_types::ServersArgs;

    #[test]
    fn test_list_hosts_is_offline() {
        let list = SetupCommands::Set(SetArgs {
            beamline: None,
            masterhost: None,
            user: None,
            dbname: None,
            csjson: None,
            list_hosts: true,
        });
        assert!(SetupHandler::is_offline(&list));

        let stop = SetupCommands::Stop(ServersArgs { servers: vec![] });
        assert!(!SetupHandler::is_offline(&stop));
    }
}
