pub mod config_server;
pub mod data_writer;
pub mod known_hosts;
pub mod setup;
pub mod types;

pub use config_server::{CONFIG_SERVER_CLASS, ConfigServerService};
pub use data_writer::{DATA_WRITER_CLASS, DataWriterService};
pub use setup::{Installation, SetOptions, SetupService};
pub use types::{DataSourceRow, ItemKind};
