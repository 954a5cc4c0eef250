extern crate collector_log;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate slog;
extern crate tempfile;

use collector_log::config::{LogType, LoggerConfig};
use collector_log::remote::SyslogAddr;
use collector_log::*;
use slog::{Drain, Logger};
use std::fs;
use std::net::{SocketAddr, UdpSocket};
use std::process;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

mod test_server {
    use super::*;

    #[derive(Debug)]
    #[must_use = "the test server does nothing useful unless you send something to it"]
    pub struct TestServer {
        pub server_addr: SocketAddr,
        server_thread: Option<thread::JoinHandle<Vec<Box<[u8]>>>>,
        client_addr: SocketAddr,
    }

    impl TestServer {
        pub fn new() -> Self {
            let server_socket = UdpSocket::bind("127.0.0.1:0").expect("couldn't bind server socket");
            server_socket.set_read_timeout(Some(Duration::from_secs(10))).expect("couldn't set server socket read timeout");

            let server_addr = server_socket.local_addr().expect("couldn't get server socket address");

            let client_addr = {
                let mut client_addr = server_addr.clone();
                client_addr.set_port(0);
                client_addr
            };

            let server_thread = Some(thread::spawn(move || {
                let mut packets = Vec::<Box<[u8]>>::new();
                let mut buf = [0u8; 65535];

                loop {
                    let (pkt_size, _) = server_socket.recv_from(&mut buf).expect("server couldn't receive packet");

                    if pkt_size == 4 && &buf[0..4] == b"STOP" {
                        break;
                    }

                    packets.push(Box::from(&buf[..pkt_size]));
                }

                packets
            }));

            TestServer { server_thread, server_addr, client_addr }
        }

        /// The address in the form `LoggerConfig::remote_syslog` takes.
        pub fn url(&self) -> String {
            format!("udp://{}", self.server_addr)
        }

        pub fn finish(mut self) -> Vec<String> {
            let server_thread = self.server_thread.take().expect("server thread already stopped");

            {
                let client_socket = UdpSocket::bind(self.client_addr).expect("couldn't bind client socket");
                client_socket.send_to(b"STOP", &self.server_addr).expect("couldn't send stop packet");
            }

            server_thread.join().expect("server thread panicked")
                .into_iter()
                .map(|pkt| String::from_utf8(pkt.to_vec()).expect("log packet contains invalid UTF-8"))
                .collect()
        }
    }

    impl Drop for TestServer {
        fn drop(&mut self) {
            if self.server_thread.is_some() {
                // Ignore errors: this only happens after a failure already.
                if let Ok(client_socket) = UdpSocket::bind(self.client_addr) {
                    let _ = client_socket.send_to(b"STOP", &self.server_addr);
                }
            }
        }
    }
}
use test_server::TestServer;

lazy_static! {
    static ref GLOBAL_LOCK: Mutex<()> = Mutex::new(());
}

/// Serializes the tests that use the process-wide facade, and leaves it
/// reset for the next one.
fn lock_global() -> MutexGuard<'static, ()> {
    let guard = GLOBAL_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    collector_log::reset();
    guard
}

fn file_config(path: &std::path::Path) -> LoggerConfig {
    LoggerConfig {
        log_file: Some(path.to_path_buf()),
        ..LoggerConfig::with_type(LogType::File)
    }
}

fn read_lines(path: &std::path::Path) -> Vec<String> {
    fs::read_to_string(path).expect("couldn't read log file")
        .lines()
        .map(String::from)
        .collect()
}

#[test]
fn remote_syslog_backend() {
    let server = TestServer::new();

    {
        let facade = LogFacade::new();
        facade.configure(Some(LoggerConfig {
            remote_syslog: server.url(),
            ..LoggerConfig::with_type(LogType::RemoteSyslog)
        })).expect("couldn't create remote syslog backend");

        noticef!(facade => "Hello, world!");
        errorf!(facade => "code {}", 7);
    }

    let logs = server.finish();
    assert_eq!(logs.len(), 2, "{:?}", logs);

    let suffix = format!("[{}]: Hello, world!", process::id());
    assert!(logs[0].starts_with("<29>"), "{}", logs[0]);
    assert!(logs[0].ends_with(&suffix), "{}", logs[0]);

    assert!(logs[1].starts_with("<27>"), "{}", logs[1]);
    assert!(logs[1].ends_with(": code 7"), "{}", logs[1]);
}

#[test]
fn remote_syslog_drain_with_key_values() {
    let server = TestServer::new();

    {
        let addr: SyslogAddr = server.url().parse().expect("bad address");
        let drain = RemoteSyslogDrain::connect(&addr).expect("couldn't connect");
        let logger = Logger::root(drain.ignore_res(), o!("conn" => 1));
        let backend = SlogBackend::from_logger(logger).with_debug(true);

        backend.debug(format_args!("tick"));
        backend.fatal(format_args!("stopping"));
    }

    let logs = server.finish();
    assert_eq!(logs.len(), 2, "{:?}", logs);
    assert!(logs[0].starts_with("<31>"), "{}", logs[0]);
    assert!(logs[0].ends_with(": tick [conn=\"1\"]"), "{}", logs[0]);
    assert!(logs[1].starts_with("<26>"), "{}", logs[1]);
}

#[test]
fn file_backend() {
    let dir = tempfile::tempdir().expect("couldn't create temporary directory");
    let path = dir.path().join("collector.log");

    let facade = LogFacade::new();
    facade.configure(Some(LoggerConfig {
        debug: true,
        ..file_config(&path)
    })).expect("couldn't create file backend");

    noticef!(facade => "started");
    debugf!(facade => "x={}", 5);
    tracef!(facade => "hidden");
    facade.reset();

    let lines = read_lines(&path);
    assert_eq!(lines.len(), 2, "{:?}", lines);

    let pid = format!("[{}] ", process::id());
    assert!(lines[0].starts_with(&pid), "{}", lines[0]);
    assert!(lines[0].ends_with(" [INF] started"), "{}", lines[0]);
    assert!(lines[1].ends_with(" [DBG] x=5"), "{}", lines[1]);

    // Timestamps are always on: "[pid] YYYY/MM/DD HH:MM:SS.uuuuuu [INF] ..."
    let stamp = &lines[0][pid.len()..lines[0].len() - " [INF] started".len()];
    assert_eq!(stamp.len(), "2024/03/01 17:02:11.000412".len(), "{}", stamp);
}

#[test]
fn file_backend_appends() {
    let dir = tempfile::tempdir().expect("couldn't create temporary directory");
    let path = dir.path().join("collector.log");
    fs::write(&path, "existing line\n").expect("couldn't seed log file");

    let facade = LogFacade::new();
    facade.configure(Some(file_config(&path))).expect("couldn't create file backend");
    errorf!(facade => "appended");
    facade.reset();

    let lines = read_lines(&path);
    assert_eq!(lines[0], "existing line");
    assert!(lines[1].ends_with(" [ERR] appended"), "{}", lines[1]);
}

#[test]
fn configure_errors() {
    let facade = LogFacade::new();

    let missing = facade.configure(Some(LoggerConfig::with_type(LogType::File)));
    match missing {
        Err(BackendError::MissingLogFile) => (),
        other => panic!("unexpected result: {:?}", other),
    }

    let bad_addr = facade.configure(Some(LoggerConfig {
        remote_syslog: "http://loghost".to_string(),
        ..LoggerConfig::with_type(LogType::RemoteSyslog)
    }));
    match bad_addr {
        Err(BackendError::Addr(ref e)) => assert_eq!(e.input(), "http://loghost"),
        other => panic!("unexpected result: {:?}", other),
    }

    let dir = tempfile::tempdir().expect("couldn't create temporary directory");
    let unopenable = facade.configure(Some(file_config(&dir.path().join("no/such/dir/x.log"))));
    match unopenable {
        Err(BackendError::Io(_)) => (),
        other => panic!("unexpected result: {:?}", other),
    }

    assert!(!facade.has_backend());
}

#[test]
fn global_facade_macros() {
    let _lock = lock_global();

    let dir = tempfile::tempdir().expect("couldn't create temporary directory");
    let path = dir.path().join("global.log");
    collector_log::configure(Some(LoggerConfig {
        trace: true,
        ..file_config(&path)
    })).expect("couldn't create file backend");

    let mut evaluated = false;
    noticef!("n");
    errorf!("e");
    fatalf!("f");
    debugf!("{}", { evaluated = true; "d" });
    tracef!("t");

    collector_log::reset();
    noticef!("after reset");

    assert!(!evaluated, "disabled debug statement evaluated its arguments");

    let labels: Vec<_> = read_lines(&path).iter()
        .map(|line| line.rsplitn(2, " [").next().map(String::from).unwrap_or_default())
        .collect();
    assert_eq!(labels, vec!["INF] n", "ERR] e", "FTL] f", "TRC] t"]);
}

#[test]
fn global_install_swaps_backends() {
    let _lock = lock_global();

    let dir = tempfile::tempdir().expect("couldn't create temporary directory");
    let first = dir.path().join("first.log");
    let second = dir.path().join("second.log");

    collector_log::configure(Some(file_config(&first))).expect("first backend");
    noticef!("one");

    let backend = SlogBackend::new(TextDrain::file(&second, false).expect("second backend"));
    let old = collector_log::install(Some(Arc::new(backend)));
    assert!(old.is_some());
    noticef!("two");

    assert!(collector_log::install(None).is_some());
    noticef!("three");
    assert!(!global().has_backend());

    assert_eq!(read_lines(&first).len(), 1);
    assert_eq!(read_lines(&second), vec![format!("[{}] [INF] two", process::id())]);
}

#[test]
fn global_concurrent_logging() {
    let _lock = lock_global();

    let dir = tempfile::tempdir().expect("couldn't create temporary directory");
    let path = dir.path().join("concurrent.log");
    collector_log::configure(Some(file_config(&path))).expect("file backend");

    let threads: Vec<_> = (0..8).map(|n| {
        thread::spawn(move || {
            for i in 0..100 {
                noticef!("thread {} line {}", n, i);
            }
        })
    }).collect();

    for thread in threads {
        thread.join().expect("logging thread panicked");
    }
    collector_log::reset();

    let lines = read_lines(&path);
    assert_eq!(lines.len(), 800);
    for line in lines {
        assert!(line.contains(" [INF] thread "), "torn line: {}", line);
    }
}
