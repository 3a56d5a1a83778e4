use nxs_cli::cli::common::{Context, finish, init_logging, parse_args};
use nxs_cli::cli::setup_handler::SetupHandler;
use nxs_cli::cli::setup_types::Cli;
use std::process::ExitCode;

async fn run(cli: Cli) -> nxs_core::Result<()> {
    let handler = SetupHandler::new();
    if SetupHandler::is_offline(&cli.command) {
        handler.list_hosts();
        return Ok(());
    }
    let context = Context::load(cli.config_dir.as_deref())?;
    handler.handle(cli.command, &context).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli: Cli = parse_args();
    init_logging(cli.verbose);
    finish(run(cli).await)
}
