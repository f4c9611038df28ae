//! Newline framing for tokio.
//!
//! Lines are handed over as raw bytes; decoding is the network's business
//! because the character set is a per-network setting.

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::ConnectionError;

/// Longest accepted line, tags included. IRCv3 allows 8191 bytes of tags
/// plus the 512-byte message.
pub const MAX_LINE_LEN: usize = 8191 + 512;

/// Splits on `\n`, drops a trailing `\r` and appends CRLF on the way out.
#[derive(Debug)]
pub struct LineCodec {
    /// Index of the next byte to check for a newline.
    next_index: usize,
    max_len: usize,
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl LineCodec {
    pub fn new() -> Self {
        Self::with_max_len(MAX_LINE_LEN)
    }

    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
        }
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }
}

impl Decoder for LineCodec {
    type Item = Vec<u8>;
    type Error = ConnectionError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Vec<u8>>, ConnectionError> {
        if let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') {
            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;
            if line.len() > self.max_len {
                return Err(ConnectionError::LineTooLong(line.len()));
            }
            let mut line = line.to_vec();
            while matches!(line.last(), Some(b'\n' | b'\r')) {
                line.pop();
            }
            Ok(Some(line))
        } else {
            self.next_index = src.len();
            if src.len() > self.max_len {
                return Err(ConnectionError::LineTooLong(src.len()));
            }
            Ok(None)
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Vec<u8>>, ConnectionError> {
        match self.decode(src)? {
            Some(line) => Ok(Some(line)),
            // A final line without terminator still counts.
            None if !src.is_empty() => {
                self.next_index = 0;
                Ok(Some(src.split().to_vec()))
            }
            None => Ok(None),
        }
    }
}

impl Encoder<Vec<u8>> for LineCodec {
    type Error = ConnectionError;

    fn encode(&mut self, line: Vec<u8>, dst: &mut BytesMut) -> Result<(), ConnectionError> {
        dst.reserve(line.len() + 2);
        dst.put_slice(&line);
        dst.put_slice(b"\r\n");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_crlf_and_lf() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"PING :a\r\nPING :b\nPART"[..]);
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(b"PING :a".to_vec()));
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(b"PING :b".to_vec()));
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        buf.extend_from_slice(b" #c\r\n");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(b"PART #c".to_vec()));
    }

    #[test]
    fn test_decode_eof_partial_line() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"ERROR :bye"[..]);
        assert_eq!(codec.decode_eof(&mut buf).unwrap(), Some(b"ERROR :bye".to_vec()));
        assert_eq!(codec.decode_eof(&mut buf).unwrap(), None);
    }

    #[test]
    fn test_line_too_long() {
        let mut codec = LineCodec::with_max_len(8);
        let mut buf = BytesMut::from(&b"0123456789"[..]);
        assert!(matches!(
            codec.decode(&mut buf),
            Err(ConnectionError::LineTooLong(10))
        ));
    }

    #[test]
    fn test_encode_appends_crlf() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::new();
        codec.encode(b"NICK ferris".to_vec(), &mut buf).unwrap();
        assert_eq!(&buf[..], b"NICK ferris\r\n");
    }
}
