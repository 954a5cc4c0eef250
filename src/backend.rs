//! The capability a [`LogFacade`] forwards to, and the implementations
//! shipped with this crate.
//!
//! [`LogFacade`]: ../struct.LogFacade.html

use slog::{Logger, SendSyncRefUnwindSafeDrain};
use std::fmt::{self, Debug};
use std::panic::UnwindSafe;
use std::sync::Arc;

/// A leveled logging sink.
///
/// Each operation receives the caller's pre-captured format arguments. How
/// (and whether) they are rendered is entirely up to the implementation; the
/// facade never looks at which implementation it is holding.
///
/// Implementations must be `Send + Sync`: one backend instance is shared by
/// every thread that logs through the facade.
pub trait LoggerBackend: Send + Sync {
    /// Logs a notice, the normal always-on level.
    fn notice(&self, args: fmt::Arguments);

    /// Logs an error.
    fn error(&self, args: fmt::Arguments);

    /// Logs a fatal error. Implementations decide whether this ends the
    /// process; the ones in this crate don't.
    fn fatal(&self, args: fmt::Arguments);

    /// Logs a debug statement.
    fn debug(&self, args: fmt::Arguments);

    /// Logs a trace statement.
    fn trace(&self, args: fmt::Arguments);
}

impl<'a, T: LoggerBackend + ?Sized> LoggerBackend for &'a T {
    fn notice(&self, args: fmt::Arguments) { (**self).notice(args) }
    fn error(&self, args: fmt::Arguments) { (**self).error(args) }
    fn fatal(&self, args: fmt::Arguments) { (**self).fatal(args) }
    fn debug(&self, args: fmt::Arguments) { (**self).debug(args) }
    fn trace(&self, args: fmt::Arguments) { (**self).trace(args) }
}

impl<T: LoggerBackend + ?Sized> LoggerBackend for Box<T> {
    fn notice(&self, args: fmt::Arguments) { (**self).notice(args) }
    fn error(&self, args: fmt::Arguments) { (**self).error(args) }
    fn fatal(&self, args: fmt::Arguments) { (**self).fatal(args) }
    fn debug(&self, args: fmt::Arguments) { (**self).debug(args) }
    fn trace(&self, args: fmt::Arguments) { (**self).trace(args) }
}

impl<T: LoggerBackend + ?Sized> LoggerBackend for Arc<T> {
    fn notice(&self, args: fmt::Arguments) { (**self).notice(args) }
    fn error(&self, args: fmt::Arguments) { (**self).error(args) }
    fn fatal(&self, args: fmt::Arguments) { (**self).fatal(args) }
    fn debug(&self, args: fmt::Arguments) { (**self).debug(args) }
    fn trace(&self, args: fmt::Arguments) { (**self).trace(args) }
}

/// A backend that drops everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullBackend;

impl LoggerBackend for NullBackend {
    fn notice(&self, _: fmt::Arguments) {}
    fn error(&self, _: fmt::Arguments) {}
    fn fatal(&self, _: fmt::Arguments) {}
    fn debug(&self, _: fmt::Arguments) {}
    fn trace(&self, _: fmt::Arguments) {}
}

/// A backend that turns every call into a record on a [`slog::Logger`].
///
/// Notices are logged at `Info`, errors at `Error`, fatal errors at
/// `Critical`, and debug and trace statements at `Debug` and `Trace`. Debug
/// and trace statements are dropped unless switched on with [`with_debug`]
/// and [`with_trace`]; the two switches are independent.
///
/// # Example
///
/// ```
/// use collector_log::{LogFacade, SlogBackend, TextDrain};
/// use std::sync::Arc;
///
/// let facade = LogFacade::new();
/// let backend = SlogBackend::new(TextDrain::console(true, false)).with_debug(true);
/// facade.install(Some(Arc::new(backend)));
///
/// facade.notice(format_args!("listening on port {}", 7777));
/// ```
///
/// [`slog::Logger`]: https://docs.rs/slog/2/slog/struct.Logger.html
/// [`with_debug`]: #method.with_debug
/// [`with_trace`]: #method.with_trace
#[derive(Clone)]
pub struct SlogBackend {
    logger: Logger,
    debug: bool,
    trace: bool,
}

impl SlogBackend {
    /// Creates a backend logging into `drain`.
    ///
    /// Errors returned by the drain are discarded: a failed write is a lost
    /// entry, never a panic.
    pub fn new<D: SendSyncRefUnwindSafeDrain + UnwindSafe + 'static>(drain: D) -> Self {
        SlogBackend::from_logger(Logger::root(drain.ignore_res(), o!()))
    }

    /// Creates a backend logging into an existing `slog::Logger`, keeping
    /// its key-value pairs.
    pub fn from_logger(logger: Logger) -> Self {
        SlogBackend {
            logger,
            debug: false,
            trace: false,
        }
    }

    /// Switches debug statements on or off.
    pub fn with_debug(mut self, on: bool) -> Self {
        self.debug = on;
        self
    }

    /// Switches trace statements on or off.
    pub fn with_trace(mut self, on: bool) -> Self {
        self.trace = on;
        self
    }

    /// The underlying logger.
    pub fn logger(&self) -> &Logger {
        &self.logger
    }
}

impl Debug for SlogBackend {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SlogBackend")
            .field("debug", &self.debug)
            .field("trace", &self.trace)
            .finish()
    }
}

impl LoggerBackend for SlogBackend {
    fn notice(&self, args: fmt::Arguments) {
        info!(self.logger, "{}", args);
    }

    fn error(&self, args: fmt::Arguments) {
        error!(self.logger, "{}", args);
    }

    fn fatal(&self, args: fmt::Arguments) {
        crit!(self.logger, "{}", args);
    }

    fn debug(&self, args: fmt::Arguments) {
        if self.debug {
            debug!(self.logger, "{}", args);
        }
    }

    fn trace(&self, args: fmt::Arguments) {
        if self.trace {
            trace!(self.logger, "{}", args);
        }
    }
}
