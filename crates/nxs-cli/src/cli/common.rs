//! Bootstrap shared by the four binaries: argument parsing, logging,
//! configuration and the gateway client, and error reporting.

use clap::Parser;
use nxs_core::error::AppError;
use nxs_core::storage::config::Config;
use nxs_core::storage::credentials::get_rest_credentials;
use nxs_core::tango::client::TangoClient;
use nxs_core::utils::retry::PollPolicy;
use nxs_core::utils::text::join_items;
use nxs_core::utils::validation::validate_url;
use simplelog::{ColorChoice, LevelFilter, TermLogger, TerminalMode};
use std::path::PathBuf;
use std::process::ExitCode;

pub const ERROR_EXIT_CODE: u8 = 255;
const CONFIG_FILE_NAME: &str = "config.toml";

/// Parse the command line; usage errors exit with [`ERROR_EXIT_CODE`].
pub fn parse_args<C: Parser>() -> C {
    match C::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() {
                i32::from(ERROR_EXIT_CODE)
            } else {
                0
            };
            let _ = err.print();
            std::process::exit(code);
        }
    }
}

/// Log to stderr so stdout only carries results.
pub fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    if let Err(e) = TermLogger::init(
        level,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("Cannot initialize logging: {}", e);
    }
}

/// Configuration and gateway client for one invocation.
pub struct Context {
    pub config: Config,
    pub client: TangoClient,
}

impl Context {
    pub fn load(config_dir: Option<&str>) -> nxs_core::Result<Self> {
        let config_path = config_dir.map(|dir| PathBuf::from(dir).join(CONFIG_FILE_NAME));
        let config = Config::load(config_path)?;

        let rest_url = config.get_rest_url();
        validate_url(&rest_url)?;
        let tango_host = config.get_tango_host()?;
        log::debug!("REST gateway {} for TANGO_HOST {}", rest_url, tango_host);

        let mut client = TangoClient::with_timeout(rest_url, tango_host, config.timeout_seconds())?;
        if let Some((user, password)) = get_rest_credentials() {
            log::debug!("Authenticating to the REST gateway as {}", user);
            client = client.with_credentials(user, password);
        }
        Ok(Self { config, client })
    }

    pub fn poll_policy(&self) -> PollPolicy {
        self.config.poll_policy()
    }
}

/// Print a list of results unless it is empty.
pub fn print_items(items: &[String], no_newlines: bool) {
    if !items.is_empty() {
        println!("{}", join_items(items, no_newlines));
    }
}

pub fn report_error(error: &AppError) {
    eprintln!("Error: {}", error.display_friendly());
    if let Some(hint) = error.troubleshooting_hint() {
        eprintln!("Hint: {}", hint);
    }
}

/// Exit status of a finished command.
pub fn finish(result: nxs_core::Result<()>) -> ExitCode {
    ExitCode::from(exit_status(result))
}

fn exit_status(result: nxs_core::Result<()>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            log::debug!("{} ({:?} severity)", e, e.severity());
            report_error(&e);
            ERROR_EXIT_CODE
        }
    }
}
