//! Rendering of slog records into the text of a log entry.
//!
//! Every drain in this crate writes plain text: a line on the console or in
//! a file, or a syslog message. How the message and its key-value pairs are
//! turned into that text is decided by a [`MsgFormat`].
//!
//! [`MsgFormat`]: trait.MsgFormat.html

use slog::{self, KV, OwnedKVList, Record};
use std::cell::Cell;
use std::fmt::{self, Debug, Display};
use std::io;
use std::sync::Arc;

/// A way to render a log message and its key-value pairs as text.
pub trait MsgFormat: Debug {
    /// Formats a log message and its key-value pairs into the given
    /// `Formatter`.
    ///
    /// This returns `slog::Result` rather than `fmt::Result` so that
    /// serializer errors survive; the free function [`format`](fn.format.html)
    /// takes care of carrying them out of the `Formatter`.
    fn fmt(&self, f: &mut fmt::Formatter, record: &Record, values: &OwnedKVList) -> slog::Result;
}

impl<'a, T: MsgFormat + ?Sized> MsgFormat for &'a T {
    fn fmt(&self, f: &mut fmt::Formatter, record: &Record, values: &OwnedKVList) -> slog::Result {
        MsgFormat::fmt(&**self, f, record, values)
    }
}

impl<T: MsgFormat + ?Sized> MsgFormat for Box<T> {
    fn fmt(&self, f: &mut fmt::Formatter, record: &Record, values: &OwnedKVList) -> slog::Result {
        MsgFormat::fmt(&**self, f, record, values)
    }
}

impl<T: MsgFormat + ?Sized> MsgFormat for Arc<T> {
    fn fmt(&self, f: &mut fmt::Formatter, record: &Record, values: &OwnedKVList) -> slog::Result {
        MsgFormat::fmt(&**self, f, record, values)
    }
}

// Implements `Display` with a closure.
struct ClosureAsDisplay<F: Fn(&mut fmt::Formatter) -> fmt::Result>(F);
impl<F: Fn(&mut fmt::Formatter) -> fmt::Result> Display for ClosureAsDisplay<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0(f)
    }
}

/// Formats a log message and its key-value pairs into the given writer using
/// the given message format.
///
/// # Errors
///
/// Fails if [`MsgFormat::fmt`] fails or if `writer` reports an I/O error.
/// An I/O error takes precedence.
///
/// [`MsgFormat::fmt`]: trait.MsgFormat.html#tymethod.fmt
pub fn format<F: MsgFormat, W: io::Write>(format: F, mut writer: W, record: &Record, values: &OwnedKVList) -> slog::Result<()> {
    // `Display::fmt` only gets `&self`, so a formatter error is parked here.
    let result: Cell<Option<slog::Error>> = Cell::new(None);

    let displayable = ClosureAsDisplay(|f| {
        if let Err(e) = MsgFormat::fmt(&format, f, record, values) {
            result.set(Some(e));
        }
        Ok(())
    });

    if let Err(e) = write!(writer, "{}", displayable) {
        return Err(slog::Error::Io(e));
    }

    match result.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Converts a formatting failure into an `io::Error`, for drains whose error
/// type is `io::Error`.
pub(crate) fn into_io_error(error: slog::Error) -> io::Error {
    match error {
        slog::Error::Io(e) => e,
        other => io::Error::new(io::ErrorKind::Other, other.to_string()),
    }
}

/// An implementation of [`MsgFormat`] that discards the key-value pairs and
/// renders only the [`msg`] part of a log [`Record`].
///
/// [`msg`]: https://docs.rs/slog/2/slog/struct.Record.html#method.msg
/// [`MsgFormat`]: trait.MsgFormat.html
/// [`Record`]: https://docs.rs/slog/2/slog/struct.Record.html
#[derive(Clone, Copy, Debug, Default)]
pub struct BasicMsgFormat;
impl MsgFormat for BasicMsgFormat {
    fn fmt(&self, f: &mut fmt::Formatter, record: &Record, _: &OwnedKVList) -> slog::Result {
        write!(f, "{}", record.msg()).map_err(From::from)
    }
}

/// Copies input to output, escaping `\`, `"` and `]` the way RFC 5424 does
/// for PARAM-VALUEs.
struct Rfc5424LikeValueEscaper<W: fmt::Write>(W);

impl<W: fmt::Write> fmt::Write for Rfc5424LikeValueEscaper<W> {
    fn write_str(&mut self, mut s: &str) -> fmt::Result {
        while let Some(index) = s.find(|c| c == '\\' || c == '"' || c == ']') {
            if index != 0 {
                self.0.write_str(&s[..index])?;
            }

            // All three delimiters are ASCII, so `index + 1` is a char boundary.
            self.write_char(s.as_bytes()[index] as char)?;
            s = &s[(index + 1)..];
        }

        if !s.is_empty() {
            self.0.write_str(s)?;
        }

        Ok(())
    }

    fn write_char(&mut self, c: char) -> fmt::Result {
        match c {
            '\\' => self.0.write_str(r"\\"),
            '"' => self.0.write_str("\\\""),
            ']' => self.0.write_str("\\]"),
            _ => self.0.write_char(c),
        }
    }
}

/// A [`MsgFormat`] that appends the key-value pairs of a record after its
/// message, in a bracketed list resembling RFC 5424 structured data.
///
/// Given the message `Hello, world!` with `key1 = "value1"`, the output is
/// `Hello, world! [key1="value1"]`. A record without key-value pairs is
/// rendered as the bare message, so plain facade calls produce plain lines.
///
/// [`MsgFormat`]: trait.MsgFormat.html
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultMsgFormat;
impl MsgFormat for DefaultMsgFormat {
    fn fmt(&self, f: &mut fmt::Formatter, record: &Record, values: &OwnedKVList) -> slog::Result {
        struct SerializerImpl<'a, 'b: 'a> {
            f: &'a mut fmt::Formatter<'b>,
            is_first_kv: bool,
        }

        impl<'a, 'b> SerializerImpl<'a, 'b> {
            fn finish(&mut self) -> slog::Result {
                if !self.is_first_kv {
                    write!(self.f, "]")?;
                }
                Ok(())
            }
        }

        impl<'a, 'b> slog::Serializer for SerializerImpl<'a, 'b> {
            fn emit_arguments(&mut self, key: slog::Key, val: &fmt::Arguments) -> slog::Result {
                use std::fmt::Write;

                self.f.write_str(if self.is_first_kv {" ["} else {" "})?;
                self.is_first_kv = false;

                write!(self.f, "{}=\"", key)?;
                write!(Rfc5424LikeValueEscaper(&mut self.f), "{}", val)?;
                self.f.write_char('"')?;
                Ok(())
            }
        }

        write!(f, "{}", record.msg())?;

        let mut serializer = SerializerImpl { f, is_first_kv: true };
        values.serialize(record, &mut serializer)?;
        record.kv().serialize(record, &mut serializer)?;
        serializer.finish()
    }
}

#[test]
fn test_rfc_5424_like_value_escaper() {
    fn case(input: &str, expected_output: &str) {
        let mut e = Rfc5424LikeValueEscaper(String::new());
        fmt::Write::write_str(&mut e, input).unwrap();
        assert_eq!(e.0, expected_output);
    }

    case("", "");
    case("foo", "foo");
    case("]", "\\]");
    case("[foo]", "[foo\\]");
    case("say \"hi\"", "say \\\"hi\\\"");
    case("C:\\dir", "C:\\\\dir");
    case("\\\"]", "\\\\\\\"\\]");
    case("]]a]]", "\\]\\]a\\]\\]");
}

#[test]
fn test_default_msg_format() {
    use slog::Level;

    let mut buf = Vec::new();

    format(
        DefaultMsgFormat,
        &mut buf,
        &record!(
            Level::Info,
            "",
            &format_args!("Hello, world!"),
            b!("key1" => "value1")
        ),
        &o!("key2" => "va\"lue2").into(),
    ).expect("formatting failed");

    let result = String::from_utf8(buf).expect("invalid UTF-8");

    assert!(
        // The KVs' order is not well-defined, so they might get reversed.
        result == "Hello, world! [key1=\"value1\" key2=\"va\\\"lue2\"]" ||
        result == "Hello, world! [key2=\"va\\\"lue2\" key1=\"value1\"]",
        "unexpected output: {}", result
    );
}

#[test]
fn test_default_msg_format_without_kvs() {
    use slog::Level;

    let mut buf = Vec::new();

    format(
        DefaultMsgFormat,
        &mut buf,
        &record!(Level::Info, "", &format_args!("x={}", 5), b!()),
        &o!().into(),
    ).expect("formatting failed");

    assert_eq!(buf, b"x=5");
}
