#[macro_use]
extern crate collector_log;

use collector_log::config::{LogType, LoggerConfig};
use std::env;

fn main() {
    // `console [console|file|syslog|remote_syslog] [path-or-address]`
    let mut args = env::args().skip(1);
    let log_type = match args.next() {
        Some(name) => match name.parse::<LogType>() {
            Ok(log_type) => log_type,
            Err(e) => {
                eprintln!("{}", e);
                return;
            }
        },
        None => LogType::Console,
    };

    let mut config = LoggerConfig {
        debug: true,
        ..LoggerConfig::with_type(log_type)
    };
    match log_type {
        LogType::File => config.log_file = args.next().map(Into::into),
        LogType::RemoteSyslog => config.remote_syslog = args.next().unwrap_or_default(),
        _ => (),
    }

    if let Err(e) = collector_log::configure(Some(config)) {
        eprintln!("couldn't set up logging: {}", e);
        return;
    }

    noticef!("Starting");
    debugf!("x={}, y={}", -1, 2);
    tracef!("trace is off, so this is never formatted: {}", expensive());
    errorf!("Error");
    fatalf!("Fatal, but still running");

    collector_log::reset();
    noticef!("Dropped: no backend after reset");
}

fn expensive() -> String {
    panic!("trace arguments were evaluated")
}
