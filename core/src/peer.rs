//! Line framing for the peer link.
//!
//! The peer speaks newline-terminated text in strict request-reply lockstep.
//! [`LineReader`] and [`LineWriter`] frame one message per line over any
//! blocking reader/writer; [`Peer`] is the seam the session driver talks to.

use std::io::{self, BufRead, Read, Write};

/// Upper bound on a single inbound line.
const MAX_LINE_BYTES: usize = 64 * 1024;

/// A line-oriented, blocking connection to the peer.
pub trait Peer {
    /// Read the next line without its terminator. `Ok(None)` on end-of-stream.
    fn recv_line(&mut self) -> io::Result<Option<String>>;

    /// Send one line; the terminator is appended and the line is flushed.
    fn send_line(&mut self, line: &str) -> io::Result<()>;
}

impl<P: Peer + ?Sized> Peer for &mut P {
    fn recv_line(&mut self) -> io::Result<Option<String>> {
        (**self).recv_line()
    }

    fn send_line(&mut self, line: &str) -> io::Result<()> {
        (**self).send_line(line)
    }
}

/// Reads newline-terminated lines.
///
/// Invalid UTF-8 is replaced rather than rejected, and a trailing `\r\n` or
/// `\n` is stripped.
pub struct LineReader<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
        }
    }

    /// Read the next line. Returns `Ok(None)` on EOF.
    ///
    /// A final line without a terminator is still returned.
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        self.buf.clear();
        let bytes_read = (&mut self.reader)
            .take(MAX_LINE_BYTES as u64)
            .read_until(b'\n', &mut self.buf)?;
        if bytes_read == 0 {
            return Ok(None);
        }
        if bytes_read == MAX_LINE_BYTES && self.buf.last() != Some(&b'\n') {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("inbound line exceeds {MAX_LINE_BYTES} bytes"),
            ));
        }

        let mut line = String::from_utf8_lossy(&self.buf).into_owned();
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }
}

/// Writes newline-terminated lines, flushing after each.
pub struct LineWriter<W> {
    writer: W,
}

impl<W: Write> LineWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// A [`Peer`] over separate inbound and outbound streams, e.g. stdin/stdout
/// or the two halves of a TCP connection.
pub struct LinePeer<R, W> {
    reader: LineReader<R>,
    writer: LineWriter<W>,
}

impl<R: BufRead, W: Write> LinePeer<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader: LineReader::new(reader),
            writer: LineWriter::new(writer),
        }
    }

    /// Recover the outbound stream, e.g. to inspect what was sent.
    pub fn into_writer(self) -> W {
        self.writer.into_inner()
    }
}

impl<R: BufRead, W: Write> Peer for LinePeer<R, W> {
    fn recv_line(&mut self) -> io::Result<Option<String>> {
        self.reader.read_line()
    }

    fn send_line(&mut self, line: &str) -> io::Result<()> {
        self.writer.write_line(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_lines_and_strips_terminators() {
        let mut reader = LineReader::new(&b"one\r\ntwo\nthree"[..]);
        assert_eq!(reader.read_line().unwrap().as_deref(), Some("one"));
        assert_eq!(reader.read_line().unwrap().as_deref(), Some("two"));
        assert_eq!(reader.read_line().unwrap().as_deref(), Some("three"));
        assert_eq!(reader.read_line().unwrap(), None);
        assert_eq!(reader.read_line().unwrap(), None);
    }

    #[test]
    fn empty_line_is_not_eof() {
        let mut reader = LineReader::new(&b"\nx\n"[..]);
        assert_eq!(reader.read_line().unwrap().as_deref(), Some(""));
        assert_eq!(reader.read_line().unwrap().as_deref(), Some("x"));
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let mut reader = LineReader::new(&b"N_1: \xff 42\n"[..]);
        let line = reader.read_line().unwrap().unwrap();
        assert!(line.starts_with("N_1: "));
        assert!(line.ends_with(" 42"));
    }

    #[test]
    fn oversized_line_is_rejected() {
        let big = vec![b'a'; MAX_LINE_BYTES + 10];
        let mut reader = LineReader::new(&big[..]);
        let err = reader.read_line().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn writer_appends_newlines() {
        let mut peer = LinePeer::new(&b""[..], Vec::new());
        peer.send_line("3").unwrap();
        peer.send_line("0 0 1 0").unwrap();
        assert_eq!(peer.recv_line().unwrap(), None);
        assert_eq!(peer.into_writer(), b"3\n0 0 1 0\n");
    }
}
