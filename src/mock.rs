//! Stand-ins for the libc syslog functions, recording each call instead of
//! talking to syslogd.

use libc::{c_char, c_int};
use std::ffi::CStr;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Event {
    OpenLog {
        ident: Option<String>,
        flags: c_int,
        facility: c_int,
    },
    SysLog {
        priority: c_int,
        message_f: String,
        message: String,
    },
}

lazy_static! {
    static ref EVENTS: Mutex<Vec<Event>> = Mutex::new(Vec::new());

    // Held for the whole of a `testing` call, so that tests running in
    // parallel don't see each other's events.
    static ref TESTING: Mutex<()> = Mutex::new(());
}

fn events() -> MutexGuard<'static, Vec<Event>> {
    EVENTS.lock().unwrap_or_else(PoisonError::into_inner)
}

unsafe fn string_at(ptr: *const c_char) -> String {
    CStr::from_ptr(ptr).to_string_lossy().into_owned()
}

pub unsafe fn openlog(ident: *const c_char, flags: c_int, facility: c_int) {
    let ident = if ident.is_null() { None } else { Some(string_at(ident)) };
    events().push(Event::OpenLog { ident, flags, facility });
}

pub unsafe fn syslog(priority: c_int, message_f: *const c_char, message: *const c_char) {
    events().push(Event::SysLog {
        priority,
        message_f: string_at(message_f),
        message: string_at(message),
    });
}

/// Runs `f`, returning its result and every event recorded while it ran.
pub fn testing<F: FnOnce() -> R, R>(f: F) -> (R, Vec<Event>) {
    let _guard = TESTING.lock().unwrap_or_else(PoisonError::into_inner);

    events().clear();
    let result = f();
    let recorded = ::std::mem::replace(&mut *events(), Vec::new());

    (result, recorded)
}
