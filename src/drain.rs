use format::{DefaultMsgFormat, format, MsgFormat};
use level::Level;
use libc::{self, c_int};
use slog::{self, Drain, OwnedKVList, Record};
use std::cell::RefCell;
use std::ffi::CStr;
use std::io::{self, Write};
use std::ptr;

#[cfg(not(test))]
use libc::{openlog, syslog};
#[cfg(test)]
use mock::{openlog, syslog};

thread_local! {
    static TL_BUF: RefCell<Vec<u8>> = RefCell::new(Vec::with_capacity(128))
}

/// [`Drain`] that sends log messages to the local syslog daemon through the
/// POSIX syslog API. Unix-like platforms only.
///
/// Entries are submitted with facility `LOG_DAEMON` and the process ID
/// attached. The program name is left to the platform libc, which on BSD,
/// GNU and Apple systems uses the name of the running executable.
///
/// # Concurrency
///
/// POSIX keeps the `openlog` settings in process-wide state. Creating a
/// `SyslogDrain` calls `openlog`, which replaces whatever settings an earlier
/// call made. Dropping a `SyslogDrain` does not call `closelog`, so replacing
/// one syslog backend with another never cuts the connection the new one is
/// using.
///
/// [`Drain`]: https://docs.rs/slog/2/slog/trait.Drain.html
#[derive(Debug)]
pub struct SyslogDrain<F: MsgFormat = DefaultMsgFormat> {
    format: F,
}

impl SyslogDrain {
    /// Opens the connection to syslog and creates a drain using
    /// [`DefaultMsgFormat`](format/struct.DefaultMsgFormat.html).
    pub fn new() -> Self {
        SyslogDrain::with_format(DefaultMsgFormat)
    }
}

impl<F: MsgFormat> SyslogDrain<F> {
    /// Opens the connection to syslog and creates a drain using the given
    /// message format.
    pub fn with_format(format: F) -> Self {
        // A null `ident` lets libc pick the program name, and no string has
        // to be kept alive for as long as libc may look at it.
        unsafe { openlog(ptr::null(), libc::LOG_PID, libc::LOG_DAEMON); }

        SyslogDrain { format }
    }
}

impl<F: MsgFormat> Drain for SyslogDrain<F> {
    type Ok = ();
    type Err = slog::Never;

    fn log(&self, record: &Record, values: &OwnedKVList) -> Result<Self::Ok, Self::Err> {
        TL_BUF.with(|tl_buf_ref| {
            let mut tl_buf_mut = tl_buf_ref.borrow_mut();
            let tl_buf = &mut *tl_buf_mut;

            let priority = Level::from_slog(record.level()).syslog_severity();

            let fmt_err = format(&self.format, &mut *tl_buf, record, values).err();

            // If formatting fails, fall back to the bare message and report
            // the error separately.
            if fmt_err.is_some() {
                tl_buf.clear();
                assert_format_success(write!(tl_buf, "{}", record.msg()));
            }

            submit(priority, b"%s\0", tl_buf);

            if let Some(fmt_err) = fmt_err {
                assert_format_success(write!(tl_buf, "{}", fmt_err));
                submit(libc::LOG_ERR, b"Error fully formatting the previous log message: %s\0", tl_buf);
            }

            Ok(())
        })
    }
}

/// Submits the contents of `buf` with the given `printf`-style template,
/// which must contain exactly one `%s` and end in a NUL byte. Clears `buf`.
fn submit(priority: c_int, template: &'static [u8], buf: &mut Vec<u8>) {
    {
        let msg = make_cstr_lossy(buf);

        unsafe {
            syslog(
                priority,
                CStr::from_bytes_with_nul_unchecked(template).as_ptr(),
                msg.as_ptr()
            );
        }
    }

    buf.clear();
}

/// Creates a `&CStr` from the given `Vec<u8>`, removing middle null bytes and
/// adding a null terminator.
fn make_cstr_lossy(s: &mut Vec<u8>) -> &CStr {
    s.retain(|b| *b != 0);
    s.push(0);

    // Sound because every null byte but the last was just removed.
    unsafe { CStr::from_bytes_with_nul_unchecked(&*s) }
}

/// Panics on I/O error, but only in debug builds.
///
/// Used for `io::Write`s into a `Vec`, which should never fail.
#[inline]
fn assert_format_success(_result: io::Result<()>) {
    #[cfg(debug_assertions)]
    _result.expect("unexpected formatting error");
}

#[test]
fn test_make_cstr_lossy() {
    let mut buf = b"a\0b\0c".to_vec();
    assert_eq!(make_cstr_lossy(&mut buf).to_bytes(), b"abc");
    assert_eq!(buf, b"abc\0");
}
