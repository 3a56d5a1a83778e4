use nxs_cli::cli::common::{Context, finish, init_logging, parse_args};
use nxs_cli::cli::config_handler::ConfigHandler;
use nxs_cli::cli::config_types::Cli;
use std::process::ExitCode;

async fn run(cli: Cli) -> nxs_core::Result<()> {
    let context = Context::load(cli.config_dir.as_deref())?;
    ConfigHandler::new(cli.options)
        .handle(cli.command, &context)
        .await
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli: Cli = parse_args();
    init_logging(cli.verbose);
    finish(run(cli).await)
}
