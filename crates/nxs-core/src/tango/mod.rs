//! Tango device bus access through the Tango REST gateway.
//!
//! Names and states are parsed here; the HTTP transport lives in [`client`],
//! the device seam in [`device`], and typed wrappers for the database and
//! Starter admin devices in [`database`] and [`starter`].

pub mod client;
pub mod database;
pub mod device;
pub mod models;
pub mod starter;

#[cfg(test)]
pub(crate) mod testing;

use crate::error::DeviceError;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_TANGO_PORT: u16 = 10000;
const TANGO_SCHEME: &str = "tango://";

/// `host:port` of a Tango database.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TangoHost {
    pub host: String,
    pub port: u16,
}

impl TangoHost {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Short host name, i.e. without the domain part.
    pub fn short_host(&self) -> &str {
        self.host.split('.').next().unwrap_or(&self.host)
    }
}

impl Default for TangoHost {
    fn default() -> Self {
        Self::new("localhost", DEFAULT_TANGO_PORT)
    }
}

impl fmt::Display for TangoHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for TangoHost {
    type Err = DeviceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_start_matches(TANGO_SCHEME).trim_end_matches('/');
        // TANGO_HOST may list several databases; the first one is used
        let s = s.split(',').next().unwrap_or_default();
        if s.is_empty() {
            return Err(DeviceError::InvalidName {
                name: s.to_string(),
                reason: "empty tango host".to_string(),
            });
        }
        match s.split_once(':') {
            Some((host, port)) => {
                let port = port.parse::<u16>().map_err(|_| DeviceError::InvalidName {
                    name: s.to_string(),
                    reason: format!("invalid port '{}'", port),
                })?;
                Ok(Self::new(host, port))
            }
            None => Ok(Self::new(s, DEFAULT_TANGO_PORT)),
        }
    }
}

/// A device name, optionally routed through a specific Tango host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceName {
    pub host: Option<TangoHost>,
    /// `domain/family/member`, or an alias
    pub path: String,
}

impl DeviceName {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            host: None,
            path: path.into(),
        }
    }

    pub fn on_host(host: TangoHost, path: impl Into<String>) -> Self {
        Self {
            host: Some(host),
            path: path.into(),
        }
    }

    /// Host this device is reached through, falling back to `default`.
    pub fn resolve_host<'a>(&'a self, default: &'a TangoHost) -> &'a TangoHost {
        self.host.as_ref().unwrap_or(default)
    }

    pub fn member(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

impl fmt::Display for DeviceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.host {
            Some(host) => write!(f, "{}/{}", host, self.path),
            None => write!(f, "{}", self.path),
        }
    }
}

impl FromStr for DeviceName {
    type Err = DeviceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches(TANGO_SCHEME);
        let parts: Vec<&str> = trimmed.split('/').collect();
        let invalid = |reason: &str| DeviceError::InvalidName {
            name: s.to_string(),
            reason: reason.to_string(),
        };

        match parts.as_slice() {
            [alias] if !alias.is_empty() && !alias.contains(':') => Ok(Self::new(*alias)),
            [domain, family, member] => {
                if domain.contains(':') {
                    return Err(invalid("expected domain/family/member after host"));
                }
                if domain.is_empty() || family.is_empty() || member.is_empty() {
                    return Err(invalid("empty name segment"));
                }
                Ok(Self::new(trimmed))
            }
            [host, domain, family, member] if host.contains(':') => {
                if domain.is_empty() || family.is_empty() || member.is_empty() {
                    return Err(invalid("empty name segment"));
                }
                Ok(Self::on_host(
                    host.parse()?,
                    format!("{}/{}/{}", domain, family, member),
                ))
            }
            _ => Err(invalid("expected [host:port/]domain/family/member")),
        }
    }
}

/// Tango device state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DevState {
    On,
    Off,
    Close,
    Open,
    Insert,
    Extract,
    Moving,
    Standby,
    Fault,
    Init,
    Running,
    Alarm,
    Disable,
    Unknown,
}

impl FromStr for DevState {
    type Err = DeviceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let state = match s.trim().to_ascii_uppercase().as_str() {
            "ON" => DevState::On,
            "OFF" => DevState::Off,
            "CLOSE" => DevState::Close,
            "OPEN" => DevState::Open,
            "INSERT" => DevState::Insert,
            "EXTRACT" => DevState::Extract,
            "MOVING" => DevState::Moving,
            "STANDBY" => DevState::Standby,
            "FAULT" => DevState::Fault,
            "INIT" => DevState::Init,
            "RUNNING" => DevState::Running,
            "ALARM" => DevState::Alarm,
            "DISABLE" => DevState::Disable,
            "UNKNOWN" => DevState::Unknown,
            other => {
                return Err(DeviceError::BadReply {
                    device: String::new(),
                    message: format!("unknown device state '{}'", other),
                });
            }
        };
        Ok(state)
    }
}

impl fmt::Display for DevState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DevState::On => "ON",
            DevState::Off => "OFF",
            DevState::Close => "CLOSE",
            DevState::Open => "OPEN",
            DevState::Insert => "INSERT",
            DevState::Extract => "EXTRACT",
            DevState::Moving => "MOVING",
            DevState::Standby => "STANDBY",
            DevState::Fault => "FAULT",
            DevState::Init => "INIT",
            DevState::Running => "RUNNING",
            DevState::Alarm => "ALARM",
            DevState::Disable => "DISABLE",
            DevState::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}
