//! Syslog over the network or a Unix socket, using RFC 3164 (BSD) style
//! messages.

use format::{self, DefaultMsgFormat, MsgFormat};
use level::Level;
use slog::{Drain, OwnedKVList, Record};
use std::env;
use std::error::Error;
use std::fmt::{self, Display};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs};
use std::path::PathBuf;
use std::process;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};
use syslog::{self, Facility, Formatter3164, LoggerBackend};

/// The port syslog servers listen on by default.
pub const DEFAULT_PORT: u16 = 514;

/// Where a [`RemoteSyslogDrain`] sends its messages.
///
/// Parsed from strings of the form:
///
/// * `udp://host[:port]`
/// * `tcp://host[:port]`
/// * `unix:///path/to/socket`
/// * `host[:port]`, meaning UDP
/// * the empty string, meaning `udp://localhost:514`
///
/// The port defaults to 514. IPv6 hosts are written in brackets, as in
/// `udp://[::1]:514`.
///
/// [`RemoteSyslogDrain`]: struct.RemoteSyslogDrain.html
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SyslogAddr {
    /// Datagrams to `host:port`.
    Udp(String, u16),

    /// A stream connection to `host:port`.
    Tcp(String, u16),

    /// A Unix socket at the given path.
    Unix(PathBuf),
}

impl Default for SyslogAddr {
    fn default() -> Self {
        SyslogAddr::Udp("localhost".to_string(), DEFAULT_PORT)
    }
}

impl Display for SyslogAddr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            SyslogAddr::Udp(ref host, port) => write!(f, "udp://{}:{}", host, port),
            SyslogAddr::Tcp(ref host, port) => write!(f, "tcp://{}:{}", host, port),
            SyslogAddr::Unix(ref path) => write!(f, "unix://{}", path.display()),
        }
    }
}

impl FromStr for SyslogAddr {
    type Err = SyslogAddrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(SyslogAddr::default());
        }

        let (scheme, rest) = match s.find("://") {
            Some(index) => (&s[..index], &s[index + 3..]),
            None => ("udp", s),
        };

        match &*scheme.to_ascii_lowercase() {
            "udp" => parse_host_port(s, rest).map(|(host, port)| SyslogAddr::Udp(host, port)),
            "tcp" => parse_host_port(s, rest).map(|(host, port)| SyslogAddr::Tcp(host, port)),
            "unix" if !rest.is_empty() => Ok(SyslogAddr::Unix(PathBuf::from(rest))),
            "unix" => Err(SyslogAddrError::new(s, "missing socket path")),
            _ => Err(SyslogAddrError::new(s, "unsupported scheme")),
        }
    }
}

fn parse_host_port(input: &str, rest: &str) -> Result<(String, u16), SyslogAddrError> {
    let rest = rest.trim_end_matches('/');

    // `[v6addr]` or `[v6addr]:port`
    if rest.starts_with('[') {
        let close = rest.find(']').ok_or_else(|| SyslogAddrError::new(input, "unterminated `[`"))?;
        let host = &rest[1..close];
        let after = &rest[close + 1..];

        let port = if after.is_empty() {
            DEFAULT_PORT
        }
        else if after.starts_with(':') {
            parse_port(input, &after[1..])?
        }
        else {
            return Err(SyslogAddrError::new(input, "unexpected text after `]`"));
        };

        if host.is_empty() {
            return Err(SyslogAddrError::new(input, "missing host"));
        }
        return Ok((host.to_string(), port));
    }

    let (host, port) = match rest.rfind(':') {
        Some(index) => (&rest[..index], parse_port(input, &rest[index + 1..])?),
        None => (rest, DEFAULT_PORT),
    };

    if host.is_empty() {
        return Err(SyslogAddrError::new(input, "missing host"));
    }
    if host.contains(':') {
        return Err(SyslogAddrError::new(input, "IPv6 hosts must be written in brackets"));
    }

    Ok((host.to_string(), port))
}

fn parse_port(input: &str, port: &str) -> Result<u16, SyslogAddrError> {
    match port.parse::<u16>() {
        Ok(0) | Err(_) => Err(SyslogAddrError::new(input, "invalid port")),
        Ok(port) => Ok(port),
    }
}

/// Indicates that a remote syslog address could not be parsed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SyslogAddrError {
    input: String,
    reason: &'static str,
}

impl SyslogAddrError {
    fn new(input: &str, reason: &'static str) -> Self {
        SyslogAddrError {
            input: input.to_string(),
            reason,
        }
    }

    /// The text that failed to parse.
    pub fn input(&self) -> &str {
        &*self.input
    }
}

impl Display for SyslogAddrError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid syslog address `{}`: {}", self.input, self.reason)
    }
}

impl Error for SyslogAddrError {}

/// [`Drain`] that writes RFC 3164 messages to a syslog server through the
/// [`syslog`] crate.
///
/// Messages carry facility `LOG_DAEMON`, the executable name and the process
/// ID; the host name is left for the server to fill in. The connection is
/// made when the drain is created; UDP sockets are bound to an ephemeral
/// local port.
///
/// [`Drain`]: https://docs.rs/slog/2/slog/trait.Drain.html
/// [`syslog`]: https://docs.rs/syslog/6/syslog/
pub struct RemoteSyslogDrain<F: MsgFormat = DefaultMsgFormat> {
    io: Mutex<syslog::Logger<LoggerBackend, Formatter3164>>,
    format: F,
}

impl RemoteSyslogDrain {
    /// Connects to the syslog server at `addr`.
    pub fn connect(addr: &SyslogAddr) -> syslog::Result<Self> {
        RemoteSyslogDrain::connect_with(addr, Formatter3164 {
            facility: Facility::LOG_DAEMON,
            hostname: None,
            process: process_name(),
            pid: process::id(),
        })
    }

    /// Connects to the syslog server at `addr`, stamping messages with the
    /// given header fields.
    pub fn connect_with(addr: &SyslogAddr, formatter: Formatter3164) -> syslog::Result<Self> {
        let logger = match *addr {
            SyslogAddr::Udp(ref host, port) => {
                let server = resolve(host, port)?;
                let local = if server.is_ipv4() {
                    SocketAddr::new(Ipv4Addr::UNSPECIFIED.into(), 0)
                }
                else {
                    SocketAddr::new(Ipv6Addr::UNSPECIFIED.into(), 0)
                };
                syslog::udp(formatter, local, server)?
            }
            SyslogAddr::Tcp(ref host, port) => syslog::tcp(formatter, resolve(host, port)?)?,
            SyslogAddr::Unix(ref path) => syslog::unix_custom(formatter, path)?,
        };

        Ok(RemoteSyslogDrain {
            io: Mutex::new(logger),
            format: DefaultMsgFormat,
        })
    }
}

impl<F: MsgFormat> RemoteSyslogDrain<F> {
    /// Replaces the format for messages and key-value pairs.
    pub fn with_format<F2: MsgFormat>(self, format: F2) -> RemoteSyslogDrain<F2> {
        RemoteSyslogDrain {
            io: self.io,
            format,
        }
    }
}

impl<F: MsgFormat> fmt::Debug for RemoteSyslogDrain<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("RemoteSyslogDrain")
            .field("format", &self.format)
            .finish()
    }
}

impl<F: MsgFormat> Drain for RemoteSyslogDrain<F> {
    type Ok = ();
    type Err = syslog::Error;

    fn log(&self, record: &Record, values: &OwnedKVList) -> syslog::Result<()> {
        let mut msg = Vec::with_capacity(128);
        if format::format(&self.format, &mut msg, record, values).is_err() {
            msg.clear();
            msg.extend_from_slice(record.msg().to_string().as_bytes());
        }
        let msg = String::from_utf8_lossy(&msg);

        let mut logger = self.io.lock().unwrap_or_else(PoisonError::into_inner);
        match Level::from_slog(record.level()) {
            Level::Fatal => logger.crit(msg),
            Level::Error => logger.err(msg),
            Level::Notice => logger.notice(msg),
            Level::Debug | Level::Trace => logger.debug(msg),
        }
    }
}

fn resolve(host: &str, port: u16) -> syslog::Result<SocketAddr> {
    let mut addrs = (host, port).to_socket_addrs()?;
    match addrs.next() {
        Some(addr) => Ok(addr),
        None => Err(syslog::Error::from(format!("no address found for `{}`", host))),
    }
}

fn process_name() -> String {
    env::current_exe().ok()
        .and_then(|path| path.file_name().map(|name| name.to_string_lossy().into_owned()))
        .unwrap_or_else(|| String::from("collector"))
}
