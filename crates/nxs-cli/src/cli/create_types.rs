use clap::{Args, Parser, Subcommand};
use nxs_core::core::creator::device_ds::DEFAULT_ATTRIBUTE;
use nxs_core::core::creator::online_ds::DEFAULT_ONLINE_FILE;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "nxscreate")]
#[command(about = "Create NeXus datasources as files or in the Configuration Server")]
#[command(version)]
#[command(after_help = "Examples:
  nxscreate tangods -f 1 -l 4 -p exp_mot -v p09/motor/exp.   # exp_mot01..04 reading Position
  nxscreate clientds -f 1 -l 8 -p exp_c -b                   # CLIENT datasources in the database
  nxscreate clientds starttime endtime -d ./ds
  nxscreate deviceds -v p09/vfcadc/exp.01 -s adc01_          # one datasource per attribute
  nxscreate onlineds /online_dir/online.xml -o

Environment Variables:
  TANGO_HOST          Default Tango database (host:port)
  NXS_REST_URL        Tango REST gateway URL")]
pub struct Cli {
    /// Enable verbose output for debugging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Custom configuration directory path
    #[arg(long, global = true)]
    pub config_dir: Option<String>,

    #[command(flatten)]
    pub output: OutputOptions,

    #[command(subcommand)]
    pub command: CreateCommands,
}

/// Where the created datasources go
#[derive(Args, Debug, Clone)]
pub struct OutputOptions {
    /// Output directory of the datasource files
    #[arg(short, long, global = true, default_value = ".")]
    pub directory: PathBuf,

    /// Prefix of the datasource file names
    #[arg(short = 'x', long, global = true, default_value = "")]
    pub file_prefix: String,

    /// Store the datasources in the Configuration Server instead of files
    #[arg(short = 'b', long, global = true)]
    pub database: bool,

    /// Replace existing datasources
    #[arg(short, long, global = true)]
    pub overwrite: bool,

    /// Configuration server device used with --database
    #[arg(long, global = true)]
    pub server: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum CreateCommands {
    /// TANGO datasources for a range of devices
    #[command(name = "tangods")]
    TangoDs(TangoDsArgs),
    /// CLIENT datasources recording under their own name
    #[command(name = "clientds")]
    ClientDs(ClientDsArgs),
    /// TANGO datasources for the attributes of one device
    #[command(name = "deviceds")]
    DeviceDs(DeviceDsArgs),
    /// TANGO datasources from an online.xml instrument description
    #[command(name = "onlineds")]
    OnlineDs {
        /// Instrument description file
        #[arg(default_value = DEFAULT_ONLINE_FILE)]
        file: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct TangoDsArgs {
    /// First index
    #[arg(short, long)]
    pub first: u32,

    /// Last index
    #[arg(short, long)]
    pub last: u32,

    /// Datasource name prefix
    #[arg(short = 'p', long)]
    pub datasource_prefix: String,

    /// Device name prefix, e.g. p09/motor/exp.
    #[arg(short = 'v', long)]
    pub device_prefix: String,

    /// Attribute to record
    #[arg(short, long, default_value = DEFAULT_ATTRIBUTE)]
    pub attribute: String,

    /// Tango host of the devices
    #[arg(short = 'u', long)]
    pub host: Option<String>,

    /// Tango port of the devices
    #[arg(short = 't', long)]
    pub port: Option<u16>,
}

#[derive(Args, Debug)]
pub struct ClientDsArgs {
    /// First index
    #[arg(short, long)]
    pub first: Option<u32>,

    /// Last index
    #[arg(short, long)]
    pub last: Option<u32>,

    /// Datasource name prefix
    #[arg(short = 'p', long)]
    pub datasource_prefix: Option<String>,

    /// Datasource names
    pub names: Vec<String>,
}

#[derive(Args, Debug)]
pub struct DeviceDsArgs {
    /// Device name
    #[arg(short = 'v', long)]
    pub device: String,

    /// Datasource name prefix
    #[arg(short = 's', long, default_value = "")]
    pub datasource_prefix: String,

    /// Attributes; all attributes but State and Status when omitted
    pub attributes: Vec<String>,
}
