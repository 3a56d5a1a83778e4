use crate::cli::common::{Context, print_items};
use crate::cli::data_types::DataCommands;
use nxs_core::core::device_tools::{find_server, list_servers};
use nxs_core::core::services::{DATA_WRITER_CLASS, DataWriterService};
use nxs_core::error::AppError;
use nxs_core::tango::TangoHost;

pub struct DataHandler {
    server: Option<String>,
}

impl DataHandler {
    pub fn new(server: Option<String>) -> Self {
        Self { server }
    }

    pub async fn handle(&self, command: DataCommands, context: &Context) -> Result<(), AppError> {
        if let DataCommands::Servers = command {
            let host = match self.server.as_deref() {
                Some(host) => Some(host.parse::<TangoHost>()?),
                None => None,
            };
            let servers = list_servers(&context.client, host.as_ref(), DATA_WRITER_CLASS).await?;
            print_items(&servers, false);
            return Ok(());
        }

        let server = find_server(&context.client, self.server.as_deref(), DATA_WRITER_CLASS).await?;
        let writer =
            DataWriterService::open(&context.client, &server, context.poll_policy()).await?;
        log::debug!("Using data writer {}", writer.name());

        match command {
            DataCommands::OpenFile { file } => writer.open_file(&file).await,
            DataCommands::SetData { json } => writer.set_data(&json).await,
            DataCommands::OpenEntry { xml_file } => writer.open_entry(xml_file.as_deref()).await,
            DataCommands::Record { json } => writer.record(json.as_deref()).await,
            DataCommands::CloseEntry => writer.close_entry().await,
            DataCommands::CloseFile => writer.close_file().await,
            DataCommands::Servers => Ok(()),
        }
    }
}
