use remote::SyslogAddrError;
use std::error::Error;
use std::fmt::{self, Display};
use std::io;
use syslog;

/// Failure to build the backend requested by a [`LoggerConfig`].
///
/// Returned by [`LogFacade::configure`]. When this happens the facade is left
/// exactly as it was: the previous backend stays installed and the gating
/// flags are not touched.
///
/// [`LoggerConfig`]: config/struct.LoggerConfig.html
/// [`LogFacade::configure`]: struct.LogFacade.html#method.configure
#[derive(Debug)]
pub enum BackendError {
    /// The log file could not be opened.
    Io(io::Error),

    /// The remote syslog server could not be reached.
    Syslog(syslog::Error),

    /// The remote syslog address is malformed.
    Addr(SyslogAddrError),

    /// The `File` log type was selected without a `log_file`.
    MissingLogFile,
}

impl Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            BackendError::Io(ref e) => write!(f, "couldn't open log file: {}", e),
            BackendError::Syslog(ref e) => write!(f, "couldn't connect to syslog: {}", e),
            BackendError::Addr(ref e) => write!(f, "{}", e),
            BackendError::MissingLogFile => f.write_str("log type `file` requires a log file path"),
        }
    }
}

impl Error for BackendError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match *self {
            BackendError::Io(ref e) => Some(e),
            BackendError::Syslog(ref e) => Some(e),
            BackendError::Addr(ref e) => Some(e),
            BackendError::MissingLogFile => None,
        }
    }
}

impl From<io::Error> for BackendError {
    fn from(e: io::Error) -> Self {
        BackendError::Io(e)
    }
}

impl From<syslog::Error> for BackendError {
    fn from(e: syslog::Error) -> Self {
        BackendError::Syslog(e)
    }
}

impl From<SyslogAddrError> for BackendError {
    fn from(e: SyslogAddrError) -> Self {
        BackendError::Addr(e)
    }
}

#[test]
fn test_backend_error_display() {
    assert_eq!(
        BackendError::MissingLogFile.to_string(),
        "log type `file` requires a log file path"
    );

    let e = BackendError::from(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
    assert_eq!(e.to_string(), "couldn't open log file: denied");
    assert!(e.source().is_some());
}
