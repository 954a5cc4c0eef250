//! Line-oriented drains for the console and for log files.

use chrono::Local;
use format::{self, DefaultMsgFormat, MsgFormat};
use level::Level;
use libc;
use slog::{Drain, OwnedKVList, Record};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::mem;
use std::path::Path;
use std::process;
use std::sync::{Mutex, PoisonError};

const TIMESTAMP_FORMAT: &'static str = "%Y/%m/%d %H:%M:%S%.6f";

/// [`Drain`] that writes one human-readable line per record:
///
/// ```text
/// [4242] 2024/03/01 17:02:11.000412 [INF] listening on :7777
/// ```
///
/// The process ID comes first, then the local time (when timestamps are
/// on), the three-letter [level label](enum.Level.html#method.label), and
/// the message as rendered by the [`MsgFormat`]. With colors on, the label is
/// wrapped in an ANSI color sequence.
///
/// Every line is flushed as soon as it is written.
///
/// [`Drain`]: https://docs.rs/slog/2/slog/trait.Drain.html
/// [`MsgFormat`]: format/trait.MsgFormat.html
#[derive(Debug)]
pub struct TextDrain<W: Write, F: MsgFormat = DefaultMsgFormat> {
    out: Mutex<W>,
    pid: u32,
    timestamps: bool,
    colors: bool,
    format: F,
}

impl TextDrain<io::Stderr> {
    /// A drain writing to standard error.
    pub fn console(timestamps: bool, colors: bool) -> Self {
        TextDrain::new(io::stderr())
            .timestamps(timestamps)
            .colors(colors)
    }
}

impl TextDrain<File> {
    /// A drain appending to the file at `path`, which is created if needed.
    /// Colors are never used in files.
    pub fn file<P: AsRef<Path>>(path: P, timestamps: bool) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(TextDrain::new(file).timestamps(timestamps))
    }
}

impl<W: Write> TextDrain<W> {
    /// A drain writing to `out`, with timestamps and colors off.
    pub fn new(out: W) -> Self {
        TextDrain {
            out: Mutex::new(out),
            pid: process::id(),
            timestamps: false,
            colors: false,
            format: DefaultMsgFormat,
        }
    }
}

impl<W: Write, F: MsgFormat> TextDrain<W, F> {
    /// Turns the timestamp prefix on or off.
    pub fn timestamps(mut self, on: bool) -> Self {
        self.timestamps = on;
        self
    }

    /// Turns ANSI colored level labels on or off.
    pub fn colors(mut self, on: bool) -> Self {
        self.colors = on;
        self
    }

    /// Replaces the process ID written at the start of each line.
    pub fn pid(mut self, pid: u32) -> Self {
        self.pid = pid;
        self
    }

    /// Sets the format for messages and key-value pairs.
    pub fn format<F2: MsgFormat>(self, format: F2) -> TextDrain<W, F2> {
        TextDrain {
            out: self.out,
            pid: self.pid,
            timestamps: self.timestamps,
            colors: self.colors,
            format,
        }
    }

    /// Consumes the drain, returning the writer.
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_line(&self, line: &mut Vec<u8>, record: &Record, values: &OwnedKVList) -> io::Result<()> {
        write!(line, "[{}] ", self.pid)?;

        if self.timestamps {
            write!(line, "{} ", Local::now().format(TIMESTAMP_FORMAT))?;
        }

        let level = Level::from_slog(record.level());
        if self.colors {
            write!(line, "{}[{}]\x1b[0m ", color_of(level), level.label())?;
        }
        else {
            write!(line, "[{}] ", level.label())?;
        }

        format::format(&self.format, &mut *line, record, values).map_err(format::into_io_error)?;
        line.push(b'\n');
        Ok(())
    }
}

impl<W: Write + Send, F: MsgFormat> Drain for TextDrain<W, F> {
    type Ok = ();
    type Err = io::Error;

    fn log(&self, record: &Record, values: &OwnedKVList) -> io::Result<()> {
        let mut line = Vec::with_capacity(128);
        self.write_line(&mut line, record, values)?;

        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        out.write_all(&line)?;
        out.flush()
    }
}

fn color_of(level: Level) -> &'static str {
    match level {
        Level::Fatal => "\x1b[1;31m",
        Level::Error => "\x1b[31m",
        Level::Notice => "\x1b[32m",
        Level::Debug => "\x1b[36m",
        Level::Trace => "\x1b[35m",
    }
}

/// Whether standard error is a character device, i.e. an interactive
/// terminal rather than a pipe or a file.
///
/// Returns `false` if the probe itself fails.
pub fn stderr_is_terminal() -> bool {
    is_char_device(libc::STDERR_FILENO)
}

fn is_char_device(fd: libc::c_int) -> bool {
    unsafe {
        let mut stat: libc::stat = mem::zeroed();
        if libc::fstat(fd, &mut stat) != 0 {
            return false;
        }
        (stat.st_mode & libc::S_IFMT) == libc::S_IFCHR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use format::BasicMsgFormat;
    use slog::{Level as SlogLevel, Record, RecordLocation, RecordStatic};
    use std::os::unix::io::AsRawFd;

    fn render<F: MsgFormat>(drain: &TextDrain<Vec<u8>, F>, level: SlogLevel, msg: &str) -> String {
        let location = RecordLocation {
            file: file!(),
            line: line!(),
            column: column!(),
            function: "",
            module: module_path!(),
        };
        let rs = RecordStatic { location: &location, tag: "", level };

        let mut line = Vec::new();
        drain.write_line(
            &mut line,
            &Record::new(&rs, &format_args!("{}", msg), b!()),
            &o!().into(),
        ).expect("formatting failed");
        String::from_utf8(line).expect("invalid UTF-8")
    }

    #[test]
    fn plain_line_layout() {
        let drain = TextDrain::new(Vec::new()).pid(42);

        assert_eq!(render(&drain, SlogLevel::Info, "hello"), "[42] [INF] hello\n");
        assert_eq!(render(&drain, SlogLevel::Critical, "boom"), "[42] [FTL] boom\n");
        assert_eq!(render(&drain, SlogLevel::Trace, "wire"), "[42] [TRC] wire\n");
    }

    #[test]
    fn colored_label() {
        let drain = TextDrain::new(Vec::new()).pid(1).colors(true);

        assert_eq!(
            render(&drain, SlogLevel::Error, "bad"),
            "[1] \x1b[31m[ERR]\x1b[0m bad\n"
        );
    }

    #[test]
    fn timestamp_prefix() {
        let drain = TextDrain::new(Vec::new()).pid(7).timestamps(true);
        let line = render(&drain, SlogLevel::Debug, "tick");

        // "[7] YYYY/MM/DD HH:MM:SS.uuuuuu [DBG] tick\n"
        assert!(line.starts_with("[7] "), "{}", line);
        assert!(line.ends_with(" [DBG] tick\n"), "{}", line);
        let stamp = &line[4..line.len() - " [DBG] tick\n".len()];
        assert_eq!(stamp.len(), "2024/03/01 17:02:11.000412".len(), "{}", stamp);
        assert_eq!(&stamp[4..5], "/");
        assert_eq!(&stamp[19..20], ".");
    }

    #[test]
    fn drain_writes_through() {
        let drain = TextDrain::new(Vec::new()).pid(3);
        drain.log(
            &record!(SlogLevel::Info, "", &format_args!("a"), b!()),
            &o!("k" => "v").into(),
        ).expect("log failed");
        drain.log(
            &record!(SlogLevel::Error, "", &format_args!("b"), b!()),
            &o!().into(),
        ).expect("log failed");

        let out = String::from_utf8(drain.into_inner()).expect("invalid UTF-8");
        assert_eq!(out, "[3] [INF] a [k=\"v\"]\n[3] [ERR] b\n");
    }

    #[test]
    fn basic_format_drops_key_values() {
        let drain = TextDrain::new(Vec::new()).pid(9).format(BasicMsgFormat);
        drain.log(
            &record!(SlogLevel::Info, "", &format_args!("ready"), b!("port" => 7777)),
            &o!("k" => "v").into(),
        ).expect("log failed");

        let out = String::from_utf8(drain.into_inner()).expect("invalid UTF-8");
        assert_eq!(out, "[9] [INF] ready\n");
    }

    #[test]
    fn char_device_check() {
        let null = File::open("/dev/null").expect("couldn't open /dev/null");
        assert!(is_char_device(null.as_raw_fd()));

        let regular = File::open(concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml"))
            .expect("couldn't open Cargo.toml");
        assert!(!is_char_device(regular.as_raw_fd()));

        let mut fds = [0; 2];
        assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0);
        assert!(!is_char_device(fds[0]));
        assert!(!is_char_device(fds[1]));
        unsafe {
            libc::close(fds[0]);
            libc::close(fds[1]);
        }

        assert!(!is_char_device(-1));
    }
}
