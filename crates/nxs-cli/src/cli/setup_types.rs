use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "nxsetup")]
#[command(about = "Install, start and reconfigure the NeXus Tango servers")]
#[command(version)]
#[command(after_help = "Examples:
  nxsetup set                           # Install the servers of a known host
  nxsetup set -b p09 -u p09user         # Install with explicit settings
  nxsetup set --list-hosts              # Show the known hosts
  nxsetup restart NXSRecSelector -l 2   # Restart every selector at level 2
  nxsetup change-prop -n ClientRecordKeys -w '[\"timestamp\"]'
  nxsetup add-recorder-path /usr/share/pyshared/sardananxsrecorder

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

    #[command(subcommand)]
    pub command: SetupCommands,
}

#[derive(Subcommand, Debug)]
pub enum SetupCommands {
    /// Register, start and configure the NXS servers of this host
    Set(SetArgs),
    /// Start servers
    Start(LevelArgs),
    /// Stop servers
    Stop(ServersArgs),
    /// Restart servers
    Restart(LevelArgs),
    /// Rename a device property
    #[command(name = "move-prop")]
    MoveProp(MovePropArgs),
    /// Set a device property
    #[command(name = "change-prop")]
    ChangeProp(ChangePropArgs),
    /// Add a recorder path to the MacroServer devices
    #[command(name = "add-recorder-path")]
    AddRecorderPath {
        /// Recorder path
        path: String,

        /// Do not restart the servers
        #[arg(short = 't', long)]
        postpone: bool,
    },
}

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Beamline name, e.g. p09
    #[arg(short, long)]
    pub beamline: Option<String>,

    /// Master host of the configuration database
    #[arg(short, long)]
    pub masterhost: Option<String>,

    /// Local user owning the database credentials
    #[arg(short, long)]
    pub user: Option<String>,

    /// Configuration database name
    #[arg(short, long)]
    pub dbname: Option<String>,

    /// JSON settings of the configuration server
    #[arg(short = 'j', long)]
    pub csjson: Option<String>,

    /// Print the known hosts and exit
    #[arg(long)]
    pub list_hosts: bool,
}

#[derive(Args, Debug)]
pub struct ServersArgs {
    /// Server classes or Class/instance names; the NXS servers by default
    pub servers: Vec<String>,
}

#[derive(Args, Debug)]
pub struct LevelArgs {
    /// Startup level
    #[arg(short, long)]
    pub level: Option<i32>,

    #[command(flatten)]
    pub servers: ServersArgs,
}

#[derive(Args, Debug)]
pub struct MovePropArgs {
    /// New property name
    #[arg(short = 'n', long)]
    pub newname: String,

    /// Old property name
    #[arg(short = 'o', long)]
    pub oldname: String,

    /// Do not restart the servers
    #[arg(short = 't', long)]
    pub postpone: bool,

    /// Server classes; NXSRecSelector by default
    pub servers: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ChangePropArgs {
    /// Property name
    #[arg(short = 'n', long)]
    pub name: String,

    /// New property value
    #[arg(short = 'w', long)]
    pub value: String,

    /// Do not restart the servers
    #[arg(short = 't', long)]
    pub postpone: bool,

    /// Server classes; NXSRecSelector by default
    pub servers: Vec<String>,
}
