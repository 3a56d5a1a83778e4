//! # nxs-core
//!
//! Core library for the NeXus/Tango data-acquisition administration tools.
//!
//! This crate provides the functionality behind the `nxsconfig`, `nxsdata`,
//! `nxscreate` and `nxsetup` binaries of `nxs-cli`. Every operation is
//! client-side glue: open a remote device, issue a few calls, return the
//! result for printing.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use nxs_core::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> nxs_core::Result<()> {
//!     let config = Config::load(None)?;
//!     let client = TangoClient::new(config.get_rest_url(), config.get_tango_host()?)?;
//!
//!     let server = find_server(&client, None, CONFIG_SERVER_CLASS).await?;
//!     let service = ConfigServerService::open(&client, &server, &config.poll_policy()).await?;
//!     let components = service.list(ItemKind::Component, false, false).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │          Tango Layer                │  REST gateway client, device seam,
//! │                                     │  database and Starter wrappers
//! ├─────────────────────────────────────┤
//! │          Core Layer                 │  Config server, data writer, setup
//! │                                     │  services, datasource creators
//! ├─────────────────────────────────────┤
//! │        Storage Layer                │  Configuration, gateway credentials
//! ├─────────────────────────────────────┤
//! │         Utils Layer                 │  Validation, retry and polling, text
//! └─────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`tango`]: Tango names, REST transport and the [`tango::device::Device`] seam
//! - [`core`]: Services for each tool and the datasource creators
//! - [`storage`]: Configuration file and credential lookup
//! - [`utils`]: Shared utilities (validation, polling, text formatting)
//! - [`display`]: Tables and progress spinners
//! - [`error`]: Hierarchical error system with troubleshooting hints

pub use error::AppError;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use nxs_core::prelude::*;
/// ```
pub mod prelude {
    // Error handling
    pub use crate::Result;
    pub use crate::error::AppError;

    // Tango access
    pub use crate::tango::client::TangoClient;
    pub use crate::tango::device::{Device, DeviceConnector};
    pub use crate::tango::{DevState, DeviceName, TangoHost};

    // Services
    pub use crate::core::device_tools::{find_server, list_servers, open_server};
    pub use crate::core::services::{
        CONFIG_SERVER_CLASS, ConfigServerService, DATA_WRITER_CLASS, DataWriterService,
        Installation, ItemKind, SetOptions, SetupService,
    };

    // Storage
    pub use crate::storage::config::Config;
    pub use crate::storage::credentials::get_rest_credentials;

    // Display utilities
    pub use crate::display::TableDisplay;
}

/// Business logic layer - services and datasource creators.
///
/// - [`core::device_tools`]: lookup and connect helpers shared by every tool
/// - [`core::services`]: Configuration Server, Data Writer and setup services
/// - [`core::creator`]: datasource generation for `nxscreate`
pub mod core;

/// Storage layer - configuration and credentials.
///
/// - [`storage::config`]: TOML configuration with environment overrides
/// - [`storage::credentials`]: REST gateway credentials from the environment
pub mod storage;

/// Utilities layer - shared helpers.
pub mod utils;

/// Tango layer - REST gateway transport and device wrappers.
///
/// - [`tango::client`]: HTTP client for the Tango REST API
/// - [`tango::device`]: the device seam and its REST implementation
/// - [`tango::database`]: typed wrapper over `sys/database/2`
/// - [`tango::starter`]: Starter admin devices
pub mod tango;

/// Display layer - terminal output.
pub mod display;

/// Error handling - hierarchical error system.
///
/// - Domain-specific error variants (Device, ConfigServer, Setup, etc.)
/// - Severity levels (Critical, High, Medium, Low)
/// - Troubleshooting hints for common issues
pub mod error;

/// Convenient Result type alias using [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;
