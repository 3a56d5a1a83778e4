use crate::cli::common::{Context, print_items};
use crate::cli::config_types::{ConfigCommands, ConfigOptions};
use nxs_core::core::device_tools::{find_server, list_servers};
use nxs_core::core::services::{CONFIG_SERVER_CLASS, ConfigServerService, ItemKind};
use nxs_core::display::TableDisplay;
use nxs_core::error::AppError;
use nxs_core::tango::TangoHost;
use nxs_core::utils::input::confirm;
use nxs_core::utils::validation::validate_name;

pub struct ConfigHandler {
    options: ConfigOptions,
}

impl ConfigHandler {
    pub fn new(options: ConfigOptions) -> Self {
        Self { options }
    }

    fn kind(&self) -> ItemKind {
        ItemKind::from_flags(self.options.datasources, self.options.profiles)
    }

    async fn open(&self, context: &Context) -> Result<ConfigServerService, AppError> {
        let server = find_server(
            &context.client,
            self.options.server.as_deref(),
            CONFIG_SERVER_CLASS,
        )
        .await?;
        log::debug!("Using configuration server {}", server);
        ConfigServerService::open(&context.client, &server, &context.poll_policy()).await
    }

    pub async fn handle(&self, command: ConfigCommands, context: &Context) -> Result<(), AppError> {
        match command {
            ConfigCommands::Servers => self.servers(context).await,
            command => self.handle_on_server(command, context).await,
        }
    }

    /// `-s` names a Tango host here, not a device.
    async fn servers(&self, context: &Context) -> Result<(), AppError> {
        let host = match self.options.server.as_deref() {
            Some(host) => Some(host.parse::<TangoHost>()?),
            None => None,
        };
        let servers = list_servers(&context.client, host.as_ref(), CONFIG_SERVER_CLASS).await?;
        print_items(&servers, self.options.no_newlines);
        Ok(())
    }

    async fn handle_on_server(
        &self,
        command: ConfigCommands,
        context: &Context,
    ) -> Result<(), AppError> {
        let no_newlines = self.options.no_newlines;
        let mandatory = self.options.mandatory;
        let service = self.open(context).await?;
        let kind = self.kind();

        match command {
            ConfigCommands::List => {
                let names = service.list(kind, mandatory, self.options.private).await?;
                print_items(&names, no_newlines);
            }
            ConfigCommands::Show(args) => {
                let documents = service.show(kind, &args.names, mandatory).await?;
                print_items(&documents, no_newlines);
            }
            ConfigCommands::Get(args) => {
                println!("{}", service.get(&args.names, mandatory).await?);
            }
            ConfigCommands::Merge(args) => {
                println!("{}", service.merge(&args.names, mandatory).await?);
            }
            ConfigCommands::Delete(args) => {
                let force = self.options.force;
                let deleted = service
                    .delete(kind, &args.names, |question| {
                        if force { Ok(true) } else { confirm(question) }
                    })
                    .await?;
                log::info!("Deleted {}", deleted.join(", "));
            }
            ConfigCommands::Upload(args) => {
                for name in &args.names {
                    validate_name(name)?;
                }
                let stored = service
                    .upload(kind, &self.options.directory, &args.names)
                    .await?;
                log::info!("Uploaded {}", stored.join(", "));
            }
            ConfigCommands::Sources(args) => {
                let sources = service.sources(&args.names, mandatory).await?;
                print_items(&sources, no_newlines);
            }
            ConfigCommands::Components(args) => {
                let components = service.components(&args.names).await?;
                print_items(&components, no_newlines);
            }
            ConfigCommands::Variables(args) => {
                let variables = service.variables(&args.names, mandatory).await?;
                print_items(&variables, no_newlines);
            }
            ConfigCommands::Data { json } => {
                println!("{}", service.data(json.as_deref()).await?);
            }
            ConfigCommands::Record { name } => {
                let records = service.records(kind, &name).await?;
                print_items(&records, no_newlines);
            }
            ConfigCommands::Describe(args) => {
                let rows = service.describe(kind, &args.names).await?;
                println!("{}", TableDisplay::new().render_datasources(&rows));
            }
            ConfigCommands::Servers => return self.servers(context).await,
        }
        Ok(())
    }
}
