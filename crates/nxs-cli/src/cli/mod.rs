pub mod common;
pub mod config_handler;
pub mod config_types;
pub mod create_handler;
pub mod create_types;
pub mod data_handler;
pub mod data_types;
pub mod setup_handler;
pub mod setup_types;
