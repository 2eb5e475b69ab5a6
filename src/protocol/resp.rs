//! RESP2 parser and encoder
//!
//! Implements parsing from bytes to RespValue and encoding from RespValue to bytes

use super::types::{RespValue, RespError};
use bytes::{BufMut, Bytes, BytesMut};
use std::io::Cursor;

const CRLF: &[u8] = b"\r\n";

/// Upper bound on the capacity reserved up front for a declared array count
const MAX_PREALLOC: usize = 1024;

/// Deepest array nesting accepted in one frame
const MAX_DEPTH: usize = 512;

/// RESP2 Parser
///
/// Parsing happens in two passes. The scan pass walks the frame without
/// allocating and remembers where it stopped, so bytes already validated are
/// not walked again when more data arrives. Once the whole frame is buffered
/// it is split off and decoded, with bulk payloads sliced out of it.
#[derive(Debug, Default)]
pub struct RespParser {
    /// Offset of the first value not yet scanned
    scanned: usize,

    /// Elements still expected by each open array, outermost first
    pending: Vec<usize>,
}

impl RespParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one complete RESP value from the front of a buffer
    ///
    /// Returns Ok(Some(value)) if a complete value was parsed and consumed,
    /// Ok(None) if more data is needed (nothing is consumed),
    /// Err(e) if the bytes can never form a valid frame.
    ///
    /// Between calls the buffer may only grow at the back.
    pub fn parse(&mut self, buf: &mut BytesMut) -> Result<Option<RespValue>, RespError> {
        let len = match self.scan(&buf[..]) {
            Ok(len) => len,
            Err(RespError::Incomplete) => return Ok(None),
            Err(e) => {
                self.reset();
                return Err(e);
            }
        };
        self.reset();

        let frame = buf.split_to(len).freeze();
        let mut cursor = Cursor::new(&frame);
        Self::parse_value(&mut cursor, 0).map(Some)
    }

    fn reset(&mut self) {
        self.scanned = 0;
        self.pending.clear();
    }

    /// Validate the frame at the front of `buf` and return its length
    fn scan(&mut self, buf: &[u8]) -> Result<usize, RespError> {
        loop {
            let (tag, line, mut end) = Self::header(buf, self.scanned)?;
            let mut opens_array = false;

            match tag {
                b'+' | b'-' => {
                    std::str::from_utf8(line).map_err(|_| RespError::InvalidUtf8)?;
                }
                b':' => {
                    Self::parse_integer(line)?;
                }
                b'$' => {
                    let len = Self::parse_integer(line)?;
                    if len != -1 {
                        let len = Self::length(len, "bulk string length")?;
                        let payload_end = end.saturating_add(len);
                        let frame_end = payload_end.saturating_add(CRLF.len());

                        if buf.len() < frame_end {
                            return Err(RespError::Incomplete);
                        }
                        if &buf[payload_end..frame_end] != CRLF {
                            return Err(RespError::MissingCrlf);
                        }
                        end = frame_end;
                    }
                }
                b'*' => {
                    let count = Self::parse_integer(line)?;
                    if count != -1 {
                        let count = Self::length(count, "array count")?;
                        if count > 0 {
                            if self.pending.len() >= MAX_DEPTH {
                                return Err(Self::too_deep());
                            }
                            self.pending.push(count);
                            opens_array = true;
                        }
                    }
                }
                _ => {}
            }

            self.scanned = end;
            if opens_array {
                continue;
            }

            // A value is complete, close every array it fills up
            loop {
                match self.pending.last_mut() {
                    None => return Ok(self.scanned),
                    Some(remaining) => {
                        *remaining -= 1;
                        if *remaining > 0 {
                            break;
                        }
                        self.pending.pop();
                    }
                }
            }
        }
    }

    /// Type tag and header line of the value starting at `pos`, plus the
    /// offset just past the line's CRLF
    fn header(buf: &[u8], pos: usize) -> Result<(u8, &[u8], usize), RespError> {
        let tag = *buf.get(pos).ok_or(RespError::Incomplete)?;
        if !matches!(tag, b'*' | b'$' | b'+' | b'-' | b':') {
            return Err(RespError::UnknownType(tag as char));
        }

        let start = pos + 1;
        let newline = Self::find_newline(buf, start)?;
        Ok((tag, &buf[start..newline - 1], newline + 1))
    }

    /// Position of the `\n` ending the line that starts at `start`
    ///
    /// A `\n` that is not preceded by `\r` is a protocol violation.
    fn find_newline(data: &[u8], start: usize) -> Result<usize, RespError> {
        let newline = data[start..]
            .iter()
            .position(|&b| b == b'\n')
            .map(|offset| start + offset)
            .ok_or(RespError::Incomplete)?;

        if newline == start || data[newline - 1] != b'\r' {
            return Err(RespError::MissingCrlf);
        }
        Ok(newline)
    }

    /// Decode a value out of a frame the scan pass has already validated
    fn parse_value(src: &mut Cursor<&Bytes>, depth: usize) -> Result<RespValue, RespError> {
        let position = src.position() as usize;
        let tag = *src.get_ref().get(position).ok_or(RespError::Incomplete)?;
        src.set_position(position as u64 + 1);

        match tag {
            b'*' => Self::parse_array(src, depth),
            b'$' => Self::parse_bulk_string(src),
            b'+' => Ok(RespValue::SimpleString(Self::read_text(src)?)),
            b'-' => Ok(RespValue::Error(Self::read_text(src)?)),
            b':' => Ok(RespValue::Integer(Self::parse_integer(Self::read_line(src)?)?)),
            other => Err(RespError::UnknownType(other as char)),
        }
    }

    /// Parse bulk string: $6\r\nfoobar\r\n or $-1\r\n (null)
    fn parse_bulk_string(src: &mut Cursor<&Bytes>) -> Result<RespValue, RespError> {
        let len = Self::parse_integer(Self::read_line(src)?)?;

        if len == -1 {
            return Ok(RespValue::Null);
        }

        let len = Self::length(len, "bulk string length")?;
        let frame: &Bytes = *src.get_ref();
        let start = src.position() as usize;
        let end = start.saturating_add(len);

        if frame.len() < end.saturating_add(CRLF.len()) {
            return Err(RespError::Incomplete);
        }

        let payload = frame.slice(start..end);
        src.set_position((end + CRLF.len()) as u64);

        Ok(RespValue::BulkString(payload))
    }

    /// Parse array: *2\r\n$3\r\nfoo\r\n$3\r\nbar\r\n
    fn parse_array(src: &mut Cursor<&Bytes>, depth: usize) -> Result<RespValue, RespError> {
        let count = Self::parse_integer(Self::read_line(src)?)?;

        if count == -1 {
            return Ok(RespValue::Null);
        }

        let count = Self::length(count, "array count")?;
        if count > 0 && depth >= MAX_DEPTH {
            return Err(Self::too_deep());
        }

        let mut elements = Vec::with_capacity(count.min(MAX_PREALLOC));
        for _ in 0..count {
            elements.push(Self::parse_value(src, depth + 1)?);
        }

        Ok(RespValue::Array(elements))
    }

    /// Read a line terminated by CRLF, returning it without the terminator
    fn read_line<'a>(src: &mut Cursor<&'a Bytes>) -> Result<&'a [u8], RespError> {
        let data: &'a Bytes = *src.get_ref();
        let start = src.position() as usize;
        let newline = Self::find_newline(data, start)?;

        src.set_position((newline + 1) as u64);
        Ok(&data[start..newline - 1])
    }

    fn read_text(src: &mut Cursor<&Bytes>) -> Result<String, RespError> {
        let line = Self::read_line(src)?;
        String::from_utf8(line.to_vec()).map_err(|_| RespError::InvalidUtf8)
    }

    fn parse_integer(line: &[u8]) -> Result<i64, RespError> {
        std::str::from_utf8(line)
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .ok_or_else(|| RespError::InvalidInteger(String::from_utf8_lossy(line).into_owned()))
    }

    /// A declared length; only -1 may be negative and it is handled by callers
    fn length(value: i64, what: &str) -> Result<usize, RespError> {
        usize::try_from(value)
            .map_err(|_| RespError::InvalidProtocol(format!("invalid {}: {}", what, value)))
    }

    fn too_deep() -> RespError {
        RespError::InvalidProtocol(format!("arrays nested deeper than {}", MAX_DEPTH))
    }
}

/// RESP2 Encoder
pub struct RespEncoder;

impl RespEncoder {
    /// Encode a RESP value to bytes
    pub fn encode(value: &RespValue) -> Bytes {
        let mut buf = BytesMut::new();
        Self::encode_to(&mut buf, value);
        buf.freeze()
    }

    /// Encode a RESP value into an existing buffer
    pub fn encode_to(buf: &mut BytesMut, value: &RespValue) {
        match value {
            RespValue::SimpleString(s) => {
                buf.put_u8(b'+');
                buf.put_slice(s.as_bytes());
                buf.put_slice(CRLF);
            }
            RespValue::Error(e) => {
                buf.put_u8(b'-');
                buf.put_slice(e.as_bytes());
                buf.put_slice(CRLF);
            }
            RespValue::Integer(i) => {
                buf.put_u8(b':');
                buf.put_slice(i.to_string().as_bytes());
                buf.put_slice(CRLF);
            }
            RespValue::BulkString(bytes) => {
                buf.put_u8(b'$');
                buf.put_slice(bytes.len().to_string().as_bytes());
                buf.put_slice(CRLF);
                buf.put_slice(bytes);
                buf.put_slice(CRLF);
            }
            RespValue::Null => {
                buf.put_slice(b"$-1\r\n");
            }
            RespValue::Array(arr) => {
                buf.put_u8(b'*');
                buf.put_slice(arr.len().to_string().as_bytes());
                buf.put_slice(CRLF);
                for elem in arr {
                    Self::encode_to(buf, elem);
                }
            }
            RespValue::Raw(bytes) => {
                buf.put_slice(bytes);
            }
        }
    }
}
