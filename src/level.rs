use libc::{self, c_int};
use slog;
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// The severity of a facade log call.
///
/// The facade has five levels, ordered from most to least severe. `Debug`
/// and `Trace` are optional: they are only dispatched when the matching
/// gating flag of the [`LogFacade`] is on.
///
/// [`LogFacade`]: struct.LogFacade.html
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Level {
    /// The program cannot continue. The facade only labels the entry; it
    /// never exits the process.
    Fatal,

    /// Something has definitely gone wrong.
    Error,

    /// Normal, always-on operational messages.
    Notice,

    /// Verbose debugging messages.
    Debug,

    /// Very verbose messages, such as protocol traffic.
    Trace,
}

impl Level {
    /// Gets the name of this `Level`, like `notice` or `trace`.
    ///
    /// The `FromStr` implementation accepts the same names, but it is
    /// case-insensitive.
    pub fn name(&self) -> &'static str {
        match *self {
            Level::Fatal => "fatal",
            Level::Error => "error",
            Level::Notice => "notice",
            Level::Debug => "debug",
            Level::Trace => "trace",
        }
    }

    /// The three-letter tag written in front of console and file entries.
    pub fn label(&self) -> &'static str {
        match *self {
            Level::Fatal => "FTL",
            Level::Error => "ERR",
            Level::Notice => "INF",
            Level::Debug => "DBG",
            Level::Trace => "TRC",
        }
    }

    /// The [`slog::Level`] that records of this level are emitted at.
    ///
    /// [`slog::Level`]: https://docs.rs/slog/2/slog/enum.Level.html
    pub fn as_slog(&self) -> slog::Level {
        match *self {
            Level::Fatal => slog::Level::Critical,
            Level::Error => slog::Level::Error,
            Level::Notice => slog::Level::Info,
            Level::Debug => slog::Level::Debug,
            Level::Trace => slog::Level::Trace,
        }
    }

    /// Maps a [`slog::Level`] back to a facade level.
    ///
    /// This is the inverse of [`as_slog`]. `Warning`, which the facade never
    /// emits, is treated as `Error` so that records from foreign loggers
    /// sharing a drain are not understated.
    ///
    /// [`as_slog`]: #method.as_slog
    /// [`slog::Level`]: https://docs.rs/slog/2/slog/enum.Level.html
    pub fn from_slog(level: slog::Level) -> Self {
        match level {
            slog::Level::Critical => Level::Fatal,
            slog::Level::Error | slog::Level::Warning => Level::Error,
            slog::Level::Info => Level::Notice,
            slog::Level::Debug => Level::Debug,
            slog::Level::Trace => Level::Trace,
        }
    }

    /// The syslog severity (`libc::LOG_*`) that entries of this level are
    /// submitted with. Syslog has no trace severity, so `Trace` shares
    /// `LOG_DEBUG` with `Debug`.
    pub fn syslog_severity(&self) -> c_int {
        match *self {
            Level::Fatal => libc::LOG_CRIT,
            Level::Error => libc::LOG_ERR,
            Level::Notice => libc::LOG_NOTICE,
            Level::Debug | Level::Trace => libc::LOG_DEBUG,
        }
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Level> for slog::Level {
    fn from(level: Level) -> Self {
        level.as_slog()
    }
}

impl FromStr for Level {
    type Err = UnknownLevelError;

    fn from_str(s: &str) -> Result<Self, <Self as FromStr>::Err> {
        let s = s.to_ascii_lowercase();

        match &*s {
            "fatal" | "crit" => Ok(Level::Fatal),
            "error" | "err" => Ok(Level::Error),
            "notice" | "info" => Ok(Level::Notice),
            "debug" => Ok(Level::Debug),
            "trace" => Ok(Level::Trace),
            _ => Err(UnknownLevelError {
                name: s,
            })
        }
    }
}

/// Indicates that `<Level as FromStr>::from_str` was called with an unknown
/// level name.
#[derive(Clone, Debug)]
#[cfg_attr(test, derive(Eq, PartialEq))]
pub struct UnknownLevelError {
    name: String,
}

impl UnknownLevelError {
    /// The unrecognized level name.
    pub fn name(&self) -> &str {
        &*self.name
    }
}

impl Display for UnknownLevelError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unrecognized log level name `{}`", self.name)
    }
}

impl Error for UnknownLevelError {}

#[test]
fn test_level_from_str() {
    assert_eq!(Level::from_str("NOTICE"), Ok(Level::Notice));
    assert_eq!(Level::from_str("crit"), Ok(Level::Fatal));
    assert_eq!(Level::from_str("foobar"), Err(UnknownLevelError { name: "foobar".to_string() }));
    assert_eq!(Level::from_str("foobar").unwrap_err().to_string(), "unrecognized log level name `foobar`");
}

#[test]
fn test_level_slog_mapping() {
    for level in &[Level::Fatal, Level::Error, Level::Notice, Level::Debug, Level::Trace] {
        assert_eq!(Level::from_slog(level.as_slog()), *level);
    }

    assert_eq!(Level::from_slog(slog::Level::Warning), Level::Error);
}

#[test]
fn test_level_severity() {
    assert_eq!(Level::Notice.syslog_severity(), libc::LOG_NOTICE);
    assert_eq!(Level::Trace.syslog_severity(), libc::LOG_DEBUG);
    assert!(Level::Fatal < Level::Trace);
}
