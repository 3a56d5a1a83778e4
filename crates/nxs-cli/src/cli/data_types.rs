use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "nxsdata")]
#[command(about = "Command line interface to the NeXus Data Writer")]
#[command(version)]
#[command(after_help = "Examples:
  nxsdata openfile /tmp/scan_00001.nxs  # Open a new file
  nxsdata openentry config.xml          # Open an entry with XML settings
  nxsdata setdata '{\"data\": {\"title\": \"scan\"}}'
  nxsdata record '{\"data\": {\"exp_c01\": 12}}'
  nxsdata closeentry
  nxsdata closefile
  nxsdata servers -s haso000:10000      # Data writers on a Tango host

Environment Variables:
  TANGO_HOST          Default Tango database (host:port)
  NXS_REST_URL        Tango REST gateway URL")]
pub struct Cli {
    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Custom configuration directory path
    #[arg(long, global = true)]
    pub config_dir: Option<String>,

    /// Data writer device, or host:port for `servers`
    #[arg(short, long, global = true)]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: DataCommands,
}

#[derive(Subcommand, Debug)]
pub enum DataCommands {
    /// Open a new NeXus file
    #[command(name = "openfile")]
    OpenFile {
        /// File name
        file: String,
    },
    /// Set global JSON data for the following commands
    #[command(name = "setdata")]
    SetData {
        /// JSON data
        json: String,
    },
    /// Open a new entry
    #[command(name = "openentry")]
    OpenEntry {
        /// XML configuration file
        xml_file: Option<PathBuf>,
    },
    /// Record one step
    Record {
        /// JSON data of this step
        json: Option<String>,
    },
    /// Close the current entry
    #[command(name = "closeentry")]
    CloseEntry,
    /// Close the current file
    #[command(name = "closefile")]
    CloseFile,
    /// Data writers exported on the Tango host given with -s
    Servers,
}
