//! Input to [`LogFacade::configure`].
//!
//! With the Cargo feature `serde`, [`LoggerConfig`] can be loaded from a
//! configuration file.
//!
//! [`LogFacade::configure`]: ../struct.LogFacade.html#method.configure
//! [`LoggerConfig`]: struct.LoggerConfig.html

use std::error::Error;
use std::fmt::{self, Display};
use std::path::PathBuf;
use std::str::FromStr;

/// Which kind of backend [`LogFacade::configure`] builds.
///
/// Conversions are provided to and from the numeric codes `0..=3`, in the
/// order the variants are declared.
///
/// [`LogFacade::configure`]: ../struct.LogFacade.html#method.configure
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LogType {
    /// Human-readable lines on standard error.
    Console,

    /// The local syslog daemon.
    Syslog,

    /// A syslog server reached over the network or a Unix socket. See
    /// [`SyslogAddr`](../remote/enum.SyslogAddr.html) for the address
    /// format.
    #[cfg_attr(feature = "serde", serde(alias = "remote-syslog", alias = "remotesyslog"))]
    RemoteSyslog,

    /// Human-readable lines appended to a file.
    File,
}

impl LogType {
    /// Gets the name of this `LogType`, like `console` or `remote_syslog`.
    pub fn name(&self) -> &'static str {
        match *self {
            LogType::Console => "console",
            LogType::Syslog => "syslog",
            LogType::RemoteSyslog => "remote_syslog",
            LogType::File => "file",
        }
    }

    /// Converts a numeric log type code to a `LogType`.
    ///
    /// Returns `None` if the code is unknown.
    pub fn from_int(value: i32) -> Option<LogType> {
        match value {
            0 => Some(LogType::Console),
            1 => Some(LogType::Syslog),
            2 => Some(LogType::RemoteSyslog),
            3 => Some(LogType::File),
            _ => None,
        }
    }
}

impl From<LogType> for i32 {
    fn from(log_type: LogType) -> Self {
        match log_type {
            LogType::Console => 0,
            LogType::Syslog => 1,
            LogType::RemoteSyslog => 2,
            LogType::File => 3,
        }
    }
}

impl Display for LogType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LogType {
    type Err = UnknownLogTypeError;

    fn from_str(s: &str) -> Result<Self, <Self as FromStr>::Err> {
        let s = s.to_ascii_lowercase();

        match &*s {
            "console" | "stderr" => Ok(LogType::Console),
            "syslog" => Ok(LogType::Syslog),
            "remote_syslog" | "remote-syslog" | "remotesyslog" => Ok(LogType::RemoteSyslog),
            "file" => Ok(LogType::File),
            _ => Err(UnknownLogTypeError {
                name: s,
            })
        }
    }
}

/// Indicates that `<LogType as FromStr>::from_str` was called with an
/// unknown name.
#[derive(Clone, Debug)]
#[cfg_attr(test, derive(Eq, PartialEq))]
pub struct UnknownLogTypeError {
    name: String,
}

impl UnknownLogTypeError {
    /// The unrecognized log type name.
    pub fn name(&self) -> &str {
        &*self.name
    }
}

impl Display for UnknownLogTypeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unrecognized log type `{}`", self.name)
    }
}

impl Error for UnknownLogTypeError {}

/// Settings for [`LogFacade::configure`].
///
/// The value is consumed by the configure call and not retained.
///
/// # Defaults
///
/// The default configuration has no `log_type`, so configuring with it
/// installs no backend and leaves logging silent.
///
/// [`LogFacade::configure`]: ../struct.LogFacade.html#method.configure
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LoggerConfig {
    /// Turn on debug entries.
    pub debug: bool,

    /// Turn on trace entries.
    pub trace: bool,

    /// Prefix console and file entries with a local timestamp.
    ///
    /// `configure` always forces this on; the field exists so configuration
    /// files written for other tools still load.
    pub log_time: bool,

    /// Path of the log file. Required when `log_type` is `File`.
    pub log_file: Option<PathBuf>,

    /// The backend to build. `None` means no backend.
    pub log_type: Option<LogType>,

    /// Address of the syslog server, used when `log_type` is
    /// `RemoteSyslog`. An empty string means `udp://localhost:514`.
    pub remote_syslog: String,
}

impl LoggerConfig {
    /// Creates a new `LoggerConfig` with default settings.
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates a configuration for the given backend kind, everything else
    /// left at its default.
    pub fn with_type(log_type: LogType) -> Self {
        LoggerConfig {
            log_type: Some(log_type),
            ..LoggerConfig::default()
        }
    }
}

#[test]
fn test_log_type_codes() {
    for code in 0..4 {
        let log_type = LogType::from_int(code).expect("known code");
        assert_eq!(i32::from(log_type), code);
    }

    assert_eq!(LogType::from_int(4), None);
    assert_eq!(LogType::from_int(-1), None);
}

#[test]
fn test_log_type_from_str() {
    assert_eq!(LogType::from_str("Console"), Ok(LogType::Console));
    assert_eq!(LogType::from_str("remote-syslog"), Ok(LogType::RemoteSyslog));
    assert_eq!(LogType::from_str("remote_syslog"), Ok(LogType::RemoteSyslog));
    assert_eq!(
        LogType::from_str("journald").unwrap_err().to_string(),
        "unrecognized log type `journald`"
    );
}

#[test]
fn test_default_config_has_no_backend() {
    let config = LoggerConfig::new();
    assert_eq!(config.log_type, None);
    assert!(!config.debug && !config.trace && !config.log_time);
}

#[cfg(feature = "serde")]
#[test]
fn test_config_from_toml() {
    use toml;

    const TOML_CONFIG: &'static str = r#"
debug = true
log_type = "remote-syslog"
remote_syslog = "tcp://logs.example.com:601"
"#;

    let config: LoggerConfig = toml::de::from_str(TOML_CONFIG).expect("deserialization failed");

    assert_eq!(
        config,
        LoggerConfig {
            debug: true,
            log_type: Some(LogType::RemoteSyslog),
            remote_syslog: "tcp://logs.example.com:601".to_string(),
            ..LoggerConfig::default()
        }
    );

    let config: LoggerConfig = toml::de::from_str("log_type = \"file\"\nlog_file = \"/var/log/collector.log\"")
        .expect("deserialization failed");
    assert_eq!(config.log_file, Some(PathBuf::from("/var/log/collector.log")));
}
