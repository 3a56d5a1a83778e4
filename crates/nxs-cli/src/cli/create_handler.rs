use crate::cli::common::{Context, print_items};
use crate::cli::create_types::{CreateCommands, OutputOptions, TangoDsArgs};
use nxs_core::core::creator::device_ds::{
    TangoRange, client_names, create_client_datasources, create_device_datasources,
    create_tango_datasources,
};
use nxs_core::core::creator::online_ds::create_online_datasources;
use nxs_core::core::creator::{ConfigServerSink, DataSourceSink, FileSink};
use nxs_core::core::device_tools::find_server;
use nxs_core::core::services::{CONFIG_SERVER_CLASS, ConfigServerService};
use nxs_core::error::AppError;
use nxs_core::tango::{DEFAULT_TANGO_PORT, DeviceName, TangoHost};

pub struct CreateHandler {
    output: OutputOptions,
}

impl CreateHandler {
    pub fn new(output: OutputOptions) -> Self {
        Self { output }
    }

    async fn sink(&self, context: &Context) -> Result<Box<dyn DataSourceSink>, AppError> {
        if self.output.database {
            let server = find_server(
                &context.client,
                self.output.server.as_deref(),
                CONFIG_SERVER_CLASS,
            )
            .await?;
            let service =
                ConfigServerService::open(&context.client, &server, &context.poll_policy()).await?;
            log::debug!("Storing datasources in {}", service.name());
            Ok(Box::new(
                ConfigServerSink::new(service, self.output.overwrite).await?,
            ))
        } else {
            log::debug!("Writing datasources to {}", self.output.directory.display());
            Ok(Box::new(FileSink::new(
                &self.output.directory,
                &self.output.file_prefix,
                self.output.overwrite,
            )?))
        }
    }

    pub async fn handle(&self, command: CreateCommands, context: &Context) -> Result<(), AppError> {
        let created = match command {
            CreateCommands::TangoDs(args) => {
                let range = tango_range(args, &context.client.tango_host);
                let sink = self.sink(context).await?;
                create_tango_datasources(sink.as_ref(), &range).await?
            }
            CreateCommands::ClientDs(args) => {
                let names = client_names(
                    &args.names,
                    args.datasource_prefix.as_deref(),
                    args.first,
                    args.last,
                )?;
                let sink = self.sink(context).await?;
                create_client_datasources(sink.as_ref(), &names).await?
            }
            CreateCommands::DeviceDs(args) => {
                let device: DeviceName = args.device.parse()?;
                let sink = self.sink(context).await?;
                create_device_datasources(
                    sink.as_ref(),
                    &context.client,
                    &device,
                    &args.datasource_prefix,
                    &args.attributes,
                )
                .await?
            }
            CreateCommands::OnlineDs { file } => {
                let sink = self.sink(context).await?;
                create_online_datasources(sink.as_ref(), &file).await?
            }
        };
        print_items(&created, false);
        Ok(())
    }
}

/// `-u`/`-t` override the default Tango host; a host alone gets the default port.
fn tango_range(args: TangoDsArgs, default_host: &TangoHost) -> TangoRange {
    let host = match (args.host, args.port) {
        (Some(host), port) => TangoHost::new(host, port.unwrap_or(DEFAULT_TANGO_PORT)),
        (None, Some(port)) => TangoHost::new(default_host.host.clone(), port),
        (None, None) => default_host.clone(),
    };
    TangoRange {
        first: args.first,
        last: args.last,
        datasource_prefix: args.datasource_prefix,
        device_prefix: args.device_prefix,
        attribute: args.attribute,
        host,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(host: Option<&str>, port: Option<u16>) -> TangoDsArgs {
        TangoDsArgs {
            first: 1,
            last: 2,
            datasource_prefix: "exp_mot".to_string(),
            device_prefix: "p09/motor/exp.".to_string(),
            attribute: "Position".to_string(),
            host: host.map(str::to_string),
            port,
        }
    }

    #[test]
    fn test_tango_range_host_resolution() {
        let default = TangoHost::new("haso000", 10000);
        assert_eq!(tango_range(args(None, None), &default).host, default);
        assert_eq!(
            tango_range(args(Some("haspp09"), None), &default).host,
            TangoHost::new("haspp09", DEFAULT_TANGO_PORT)
        );
        assert_eq!(
            tango_range(args(None, Some(20000)), &default).host,
            TangoHost::new("haso000", 20000)
        );
    }
}
