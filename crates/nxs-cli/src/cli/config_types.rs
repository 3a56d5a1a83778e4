use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "nxsconfig")]
#[command(about = "Command line interface to the NeXus Configuration Server")]
#[command(version)]
#[command(after_help = "Examples:
  nxsconfig list                        # List available components
  nxsconfig list -d                     # List available datasources
  nxsconfig show slit1 pilatus          # Show component XML
  nxsconfig get slit1 -m                # Merged configuration with mandatory components
  nxsconfig upload -d -i ./ds exp_c01   # Store ./ds/exp_c01.ds.xml
  nxsconfig describe -d exp_c01         # Table of datasource records
  nxsconfig servers -s haso000:10000    # Configuration servers on a Tango host

Environment Variables:
  TANGO_HOST          Default Tango database (host:port)
  NXS_REST_URL        Tango REST gateway URL
  NXS_REST_USER       REST gateway user
  NXS_REST_PASSWORD   REST gateway password")]
pub struct Cli {
    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Custom configuration directory path
    #[arg(long, global = true)]
    pub config_dir: Option<String>,

    #[command(flatten)]
    pub options: ConfigOptions,

    #[command(subcommand)]
    pub command: ConfigCommands,
}

/// Flags shared by every `nxsconfig` command
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigOptions {
    /// Configuration server device, or host:port for `servers`
    #[arg(short, long, global = true)]
    pub server: Option<String>,

    /// Operate on datasources
    #[arg(short, long, global = true, conflicts_with = "profiles")]
    pub datasources: bool,

    /// Operate on profiles (selections)
    #[arg(short = 'r', long, global = true)]
    pub profiles: bool,

    /// Include mandatory components
    #[arg(short, long, global = true)]
    pub mandatory: bool,

    /// Include private components, i.e. names starting with '__'
    #[arg(short, long, global = true)]
    pub private: bool,

    /// Separate results with spaces instead of newlines
    #[arg(short, long, global = true)]
    pub no_newlines: bool,

    /// Do not ask for confirmation
    #[arg(short, long, global = true)]
    pub force: bool,

    /// Directory with the files to upload
    #[arg(short = 'i', long, global = true, default_value = ".")]
    pub directory: PathBuf,
}

#[derive(Args, Debug, Clone, Default)]
pub struct NamesArgs {
    /// Component, datasource or profile names
    pub names: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// List stored names
    List,
    /// Show the stored XML documents
    Show(NamesArgs),
    /// Create the final configuration of the given components
    Get(NamesArgs),
    /// Merge the given components
    Merge(NamesArgs),
    /// Delete stored documents
    Delete(NamesArgs),
    /// Store documents read from the upload directory
    #[command(after_help = "Files are read from <directory>/<name>.xml for components,
<directory>/<name>.ds.xml for datasources and <directory>/<name>.json for
profiles. Without names every matching file of the directory is stored.")]
    Upload(NamesArgs),
    /// Datasources of the given components
    Sources(NamesArgs),
    /// Components the given components depend on
    Components(NamesArgs),
    /// Variables of the given components
    Variables(NamesArgs),
    /// Show the configuration variables, setting them first when JSON is given
    Data {
        /// JSON dictionary of variables
        json: Option<String>,
    },
    /// Record names of a component or datasource
    Record {
        /// Component name, or datasource name with -d
        name: String,
    },
    /// Table of datasources and their records
    Describe(NamesArgs),
    /// Configuration servers exported on the Tango host given with -s
    Servers,
}
