//! Command line front ends of the NeXus/Tango administration tools.
//!
//! Each binary under `src/bin` parses its [`clap`] types, loads the
//! [`cli::common::Context`] and hands the command to its handler.

pub mod cli;
