use backend::{LoggerBackend, SlogBackend};
use config::{LogType, LoggerConfig};
use drain::SyslogDrain;
use error::BackendError;
use level::Level;
use remote::{RemoteSyslogDrain, SyslogAddr};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use text::{self, TextDrain};

lazy_static! {
    /// The process-wide facade used by the free functions and the logging
    /// macros.
    static ref GLOBAL: LogFacade = LogFacade::new();
}

/// The process-wide [`LogFacade`](struct.LogFacade.html).
///
/// It starts with no backend and both gating flags off, and lives until the
/// process exits.
pub fn global() -> &'static LogFacade {
    &*GLOBAL
}

/// One active logging backend, swappable at runtime, plus the debug and trace
/// gating flags.
///
/// Every logging call locks the backend slot, so a call sees either the old
/// or the new backend in full while another thread swaps it. The gating
/// flags are plain atomics: a disabled debug or trace call returns after one
/// atomic load, without touching the lock.
///
/// Most programs use the process-wide instance through [`global`] and the
/// `noticef!`-style macros. A `LogFacade` can also be created and owned
/// directly, which keeps independent tests from sharing state.
///
/// [`global`]: fn.global.html
pub struct LogFacade {
    backend: Mutex<Option<Arc<dyn LoggerBackend>>>,
    debug: AtomicBool,
    trace: AtomicBool,
}

impl LogFacade {
    /// Creates a facade with no backend and both flags off.
    pub fn new() -> Self {
        LogFacade {
            backend: Mutex::new(None),
            debug: AtomicBool::new(false),
            trace: AtomicBool::new(false),
        }
    }

    /// Builds the backend described by `config` and installs it.
    ///
    /// `None` is the same as `LoggerConfig::default()`. Timestamps are always
    /// turned on, whatever `config.log_time` says. A config without a
    /// `log_type` removes the current backend, leaving logging silent.
    ///
    /// The debug and trace flags are only ever switched *on* here; a config
    /// with `debug: false` leaves an already-enabled flag alone. Use
    /// [`reset`](#method.reset) to switch them off.
    ///
    /// # Errors
    ///
    /// If the backend can't be built, the error is returned and the facade is
    /// left untouched.
    pub fn configure(&self, config: Option<LoggerConfig>) -> Result<(), BackendError> {
        let mut config = config.unwrap_or_default();
        config.log_time = true;

        let backend = match config.log_type {
            Some(log_type) => Some(build_backend(log_type, &config)?),
            None => None,
        };

        if config.debug {
            self.debug.store(true, Ordering::SeqCst);
        }
        if config.trace {
            self.trace.store(true, Ordering::SeqCst);
        }

        self.install(backend);
        Ok(())
    }

    /// Replaces the active backend, returning the one it displaced.
    ///
    /// `None` removes the backend. The gating flags are not touched. The
    /// displaced backend is not flushed or closed by the facade; it is
    /// dropped when the returned `Arc` (and any other clone) goes away.
    pub fn install(&self, backend: Option<Arc<dyn LoggerBackend>>) -> Option<Arc<dyn LoggerBackend>> {
        let mut slot = self.lock();
        ::std::mem::replace(&mut *slot, backend)
    }

    /// Removes the backend and switches both gating flags off.
    ///
    /// Calling this twice is the same as calling it once.
    pub fn reset(&self) {
        self.trace.store(false, Ordering::SeqCst);
        self.debug.store(false, Ordering::SeqCst);

        *self.lock() = None;
    }

    /// Whether debug statements are currently dispatched.
    #[inline]
    pub fn debug_enabled(&self) -> bool {
        self.debug.load(Ordering::Relaxed)
    }

    /// Whether trace statements are currently dispatched.
    #[inline]
    pub fn trace_enabled(&self) -> bool {
        self.trace.load(Ordering::Relaxed)
    }

    /// Whether a backend is installed.
    pub fn has_backend(&self) -> bool {
        self.lock().is_some()
    }

    /// Whether a call at `level` would currently be dispatched to a backend,
    /// as far as gating is concerned.
    #[inline]
    pub fn enabled(&self, level: Level) -> bool {
        match level {
            Level::Debug => self.debug_enabled(),
            Level::Trace => self.trace_enabled(),
            _ => true,
        }
    }

    /// Logs a notice.
    pub fn notice(&self, args: fmt::Arguments) {
        self.dispatch(Level::Notice, args)
    }

    /// Logs an error.
    pub fn error(&self, args: fmt::Arguments) {
        self.dispatch(Level::Error, args)
    }

    /// Logs a fatal error. The process keeps running.
    pub fn fatal(&self, args: fmt::Arguments) {
        self.dispatch(Level::Fatal, args)
    }

    /// Logs a debug statement, if debug statements are enabled.
    #[inline]
    pub fn debug(&self, args: fmt::Arguments) {
        if self.debug_enabled() {
            self.dispatch(Level::Debug, args)
        }
    }

    /// Logs a trace statement, if trace statements are enabled.
    #[inline]
    pub fn trace(&self, args: fmt::Arguments) {
        if self.trace_enabled() {
            self.dispatch(Level::Trace, args)
        }
    }

    /// Logs at the given level, applying the same gating as the
    /// level-specific methods.
    pub fn log(&self, level: Level, args: fmt::Arguments) {
        if self.enabled(level) {
            self.dispatch(level, args)
        }
    }

    fn dispatch(&self, level: Level, args: fmt::Arguments) {
        let slot = self.lock();
        let backend = match *slot {
            Some(ref backend) => backend,
            None => return,
        };

        match level {
            Level::Notice => backend.notice(args),
            Level::Error => backend.error(args),
            Level::Fatal => backend.fatal(args),
            Level::Debug => backend.debug(args),
            Level::Trace => backend.trace(args),
        }
    }

    // A backend that panicked mid-call poisons the lock; the slot itself is
    // still a whole `Option<Arc<_>>`, so keep going with it.
    fn lock(&self) -> MutexGuard<'_, Option<Arc<dyn LoggerBackend>>> {
        self.backend.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for LogFacade {
    fn default() -> Self {
        LogFacade::new()
    }
}

impl fmt::Debug for LogFacade {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("LogFacade")
            .field("has_backend", &self.has_backend())
            .field("debug", &self.debug_enabled())
            .field("trace", &self.trace_enabled())
            .finish()
    }
}

fn build_backend(log_type: LogType, config: &LoggerConfig) -> Result<Arc<dyn LoggerBackend>, BackendError> {
    let backend = match log_type {
        LogType::File => {
            let path = config.log_file.as_ref().ok_or(BackendError::MissingLogFile)?;
            SlogBackend::new(TextDrain::file(path, config.log_time)?)
        }
        LogType::RemoteSyslog => {
            let addr: SyslogAddr = config.remote_syslog.parse()?;
            SlogBackend::new(RemoteSyslogDrain::connect(&addr)?)
        }
        LogType::Console => {
            SlogBackend::new(TextDrain::console(config.log_time, text::stderr_is_terminal()))
        }
        LogType::Syslog => SlogBackend::new(SyslogDrain::new()),
    };

    Ok(Arc::new(backend.with_debug(config.debug).with_trace(config.trace)))
}
