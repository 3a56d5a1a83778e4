use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("CliError: {0}")]
    Cli(#[from] CliError),
    #[error("DeviceError: {0}")]
    Device(#[from] DeviceError),
    #[error("ConfigError: {0}")]
    Config(#[from] ConfigError),
    #[error("StorageError: {0}")]
    Storage(#[from] StorageError),
    #[error("ConfigServerError: {0}")]
    ConfigServer(#[from] ConfigServerError),
    #[error("WriterError: {0}")]
    Writer(#[from] WriterError),
    #[error("SetupError: {0}")]
    Setup(#[from] SetupError),
    #[error("CreatorError: {0}")]
    Creator(#[from] CreatorError),
    #[error("UtilsError: {0}")]
    Utils(#[from] UtilsError),
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}

/// Failures talking to a remote device through the REST gateway.
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64, endpoint: String },
    #[error("HTTP error: {status} {message}")]
    Http {
        status: u16,
        endpoint: String,
        message: String,
    },
    #[error("Not authorized by the REST gateway")]
    Unauthorized {
        status: u16,
        endpoint: String,
        server_message: String,
    },
    #[error("Device or member not found: {endpoint}")]
    NotFound { endpoint: String },
    #[error("Cannot connect into the server: {device}")]
    Unreachable { device: String },
    #[error("Unexpected reply from {device}: {message}")]
    BadReply { device: String, message: String },
    #[error("Invalid device name '{name}': {reason}")]
    InvalidName { name: String, reason: String },
    #[error("No {class} server found on {tango_host}")]
    NoServer { class: String, tango_host: String },
}

#[derive(Error, Debug)]
pub enum ConfigServerError {
    #[error("{kind}(s) {} not stored in the configuration server", quoted(.names))]
    NotStored { kind: String, names: Vec<String> },
    #[error("Cannot read {path}: {reason}")]
    UploadFile { path: String, reason: String },
    #[error("No names given for '{command}'")]
    MissingNames { command: String },
}

#[derive(Error, Debug)]
pub enum WriterError {
    #[error("Invalid JSON data: {reason}")]
    InvalidJson { reason: String },
    #[error("Cannot read XML settings from {path}: {reason}")]
    XmlSettings { path: String, reason: String },
    #[error("Missing argument for '{command}': {argument}")]
    MissingArgument { command: String, argument: String },
}

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Unknown host '{host}'")]
    UnknownHost { host: String },
    #[error("Server {server} did not start")]
    StartTimeout { server: String },
    #[error("Server {server} did not stop")]
    StopTimeout { server: String },
    #[error("No registered instance of {server}")]
    NoInstance { server: String },
    #[error("Cannot determine local hostname: {reason}")]
    Hostname { reason: String },
}

#[derive(Error, Debug)]
pub enum CreatorError {
    #[error("Cannot parse {source_name}: {reason}")]
    Parse { source_name: String, reason: String },
    #[error("Cannot write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid index range {first}..{last}")]
    InvalidRange { first: u32, last: u32 },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("File I/O error at {path}: {source}")]
    FileIo {
        path: String,
        source: std::io::Error,
    },
    #[error("Configuration parse error: {message}")]
    ConfigParseError { message: String },
    #[error("Configuration directory not found")]
    ConfigDirNotFound,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration value for '{field}': {value}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Error, Debug)]
pub enum UtilsError {
    #[error("Validation error: {message}")]
    Validation { message: String },
    #[error("Input processing error: {message}")]
    InputProcessing { message: String },
}

fn quoted(names: &[String]) -> String {
    names
        .iter()
        .map(|name| format!("'{}'", name))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorSeverity {
    Critical,
    High,
    Medium,
    Low,
}

impl AppError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AppError::Cli(_) => ErrorSeverity::Medium,
            AppError::Device(device_error) => match device_error {
                DeviceError::Unreachable { .. } => ErrorSeverity::Critical,
                DeviceError::Unauthorized { .. } => ErrorSeverity::High,
                DeviceError::Http { status, .. } if *status >= 500 => ErrorSeverity::High,
                _ => ErrorSeverity::Medium,
            },
            AppError::Config(_) => ErrorSeverity::High,
            AppError::Storage(_) => ErrorSeverity::Medium,
            AppError::ConfigServer(_) => ErrorSeverity::Medium,
            AppError::Writer(_) => ErrorSeverity::Medium,
            AppError::Setup(setup_error) => match setup_error {
                SetupError::StartTimeout { .. } | SetupError::StopTimeout { .. } => {
                    ErrorSeverity::High
                }
                _ => ErrorSeverity::Medium,
            },
            AppError::Creator(_) => ErrorSeverity::Medium,
            AppError::Utils(_) => ErrorSeverity::Low,
        }
    }

    /// Message without the layer prefix, as printed by the binaries.
    pub fn display_friendly(&self) -> String {
        match self {
            AppError::Cli(e) => e.to_string(),
            AppError::Device(e) => e.to_string(),
            AppError::Config(e) => e.to_string(),
            AppError::Storage(e) => e.to_string(),
            AppError::ConfigServer(e) => e.to_string(),
            AppError::Writer(e) => e.to_string(),
            AppError::Setup(e) => e.to_string(),
            AppError::Creator(e) => e.to_string(),
            AppError::Utils(e) => e.to_string(),
        }
    }

    pub fn troubleshooting_hint(&self) -> Option<String> {
        match self {
            AppError::Device(DeviceError::Unreachable { .. }) => Some(
                "Check that the device server is running ('nxsetup start') and TANGO_HOST is correct"
                    .to_string(),
            ),
            AppError::Device(DeviceError::Timeout { .. } | DeviceError::Http { status: 0, .. }) => {
                Some("Check that the Tango REST gateway is reachable (NXS_REST_URL)".to_string())
            }
            AppError::Device(DeviceError::Unauthorized { .. }) => {
                Some("Set NXS_REST_USER and NXS_REST_PASSWORD for the REST gateway".to_string())
            }
            AppError::Device(DeviceError::NoServer { .. }) => {
                Some("Specify the device with --server <domain/family/member>".to_string())
            }
            AppError::ConfigServer(ConfigServerError::NotStored { .. }) => {
                Some("'nxsconfig list' shows the stored names".to_string())
            }
            AppError::Setup(SetupError::UnknownHost { .. }) => {
                Some("Pass --beamline and --user explicitly".to_string())
            }
            _ => None,
        }
    }
}
