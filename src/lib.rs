//! A process-wide logging facade with a swappable backend.
//!
//! Code anywhere in a program logs through five leveled macros,
//! [`noticef!`], [`errorf!`], [`fatalf!`], [`debugf!`] and [`tracef!`], without
//! knowing where the entries end up. The destination is one
//! [`LoggerBackend`], chosen at startup and replaceable at any time:
//!
//! * human-readable lines on standard error, colored when it is a terminal,
//! * the same lines appended to a file,
//! * the local syslog daemon, through the POSIX syslog API,
//! * a remote syslog server, over UDP, TCP or a Unix socket.
//!
//! The built-in backends are [`slog`] loggers ending in one of the drains in
//! this crate, so any other `slog` drain can be installed through
//! [`SlogBackend`] as well.
//!
//! Until a backend is installed, logging does nothing. Debug and trace
//! statements are dropped, without formatting their arguments, unless they
//! have been switched on.
//!
//! [`noticef!`]: macro.noticef.html
//! [`errorf!`]: macro.errorf.html
//! [`fatalf!`]: macro.fatalf.html
//! [`debugf!`]: macro.debugf.html
//! [`tracef!`]: macro.tracef.html
//! [`LoggerBackend`]: trait.LoggerBackend.html
//! [`SlogBackend`]: struct.SlogBackend.html
//! [`slog`]: https://docs.rs/slog/2/slog/
//!
//! # Example
//!
//! ```
//! #[macro_use] extern crate collector_log;
//!
//! use collector_log::config::{LogType, LoggerConfig};
//!
//! # fn main() {
//! collector_log::configure(Some(LoggerConfig {
//!     debug: true,
//!     ..LoggerConfig::with_type(LogType::Console)
//! })).expect("couldn't set up logging");
//!
//! noticef!("listening on port {}", 7777);
//! debugf!("x={}", 5);
//! tracef!("not shown: {}", "trace is off");
//!
//! collector_log::reset();
//! # }
//! ```
//!
//! # Cargo features
//!
//! If the Cargo feature `serde` is enabled, [`config::LoggerConfig`] can be
//! loaded from a configuration file.
//!
//! [`config::LoggerConfig`]: config/struct.LoggerConfig.html
//!
//! # Local syslog and concurrency
//!
//! The POSIX syslog API keeps its settings in process-wide state, and every
//! [`SyslogDrain`] calls `openlog` when it is created. Programs should leave
//! `openlog` and `closelog` to this crate while a syslog backend is in use.
//!
//! [`SyslogDrain`]: struct.SyslogDrain.html

#![cfg(unix)]
#![warn(missing_docs)]

extern crate chrono;
extern crate libc;

#[macro_use]
extern crate lazy_static;

#[cfg(feature = "serde")]
#[macro_use]
extern crate serde;

#[macro_use]
extern crate slog;

extern crate syslog;

#[cfg(all(test, feature = "serde"))]
extern crate toml;

mod backend;
pub use backend::*;

pub mod config;

mod drain;
pub use drain::*;

mod error;
pub use error::*;

mod facade;
pub use facade::*;

pub mod format;

mod level;
pub use level::*;

#[cfg(test)]
mod mock;

pub mod remote;
pub use remote::RemoteSyslogDrain;

mod text;
pub use text::*;

use std::sync::Arc;

/// Configures the process-wide facade. See
/// [`LogFacade::configure`](struct.LogFacade.html#method.configure).
pub fn configure(config: Option<config::LoggerConfig>) -> Result<(), BackendError> {
    global().configure(config)
}

/// Replaces the process-wide backend, returning the displaced one. See
/// [`LogFacade::install`](struct.LogFacade.html#method.install).
pub fn install(backend: Option<Arc<dyn LoggerBackend>>) -> Option<Arc<dyn LoggerBackend>> {
    global().install(backend)
}

/// Removes the process-wide backend and switches debug and trace off.
pub fn reset() {
    global().reset()
}

/// Logs a notice.
///
/// Takes `format!`-style arguments, optionally preceded by a facade and
/// `=>`. Without one, the process-wide facade is used.
///
/// ```
/// # #[macro_use] extern crate collector_log;
/// # fn main() {
/// let facade = collector_log::LogFacade::new();
/// noticef!(facade => "connected to {}", "db-1");
/// noticef!("server ready");
/// # }
/// ```
#[macro_export]
macro_rules! noticef {
    ($facade:expr => $($arg:tt)+) => {
        ($facade).notice(format_args!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::global().notice(format_args!($($arg)+))
    };
}

/// Logs an error. Same forms as [`noticef!`](macro.noticef.html).
#[macro_export]
macro_rules! errorf {
    ($facade:expr => $($arg:tt)+) => {
        ($facade).error(format_args!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::global().error(format_args!($($arg)+))
    };
}

/// Logs a fatal error. Same forms as [`noticef!`](macro.noticef.html).
///
/// The process keeps running; exiting is up to the caller.
#[macro_export]
macro_rules! fatalf {
    ($facade:expr => $($arg:tt)+) => {
        ($facade).fatal(format_args!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::global().fatal(format_args!($($arg)+))
    };
}

/// Logs a debug statement. Same forms as [`noticef!`](macro.noticef.html).
///
/// When debug statements are off, the arguments are not evaluated.
#[macro_export]
macro_rules! debugf {
    ($facade:expr => $($arg:tt)+) => {{
        let facade: &$crate::LogFacade = &$facade;
        if facade.debug_enabled() {
            facade.debug(format_args!($($arg)+))
        }
    }};
    ($($arg:tt)+) => {{
        let facade = $crate::global();
        if facade.debug_enabled() {
            facade.debug(format_args!($($arg)+))
        }
    }};
}

/// Logs a trace statement. Same forms as [`noticef!`](macro.noticef.html).
///
/// When trace statements are off, the arguments are not evaluated.
#[macro_export]
macro_rules! tracef {
    ($facade:expr => $($arg:tt)+) => {{
        let facade: &$crate::LogFacade = &$facade;
        if facade.trace_enabled() {
            facade.trace(format_args!($($arg)+))
        }
    }};
    ($($arg:tt)+) => {{
        let facade = $crate::global();
        if facade.trace_enabled() {
            facade.trace(format_args!($($arg)+))
        }
    }};
}
