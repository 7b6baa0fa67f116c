//! Permissive UTF-8 character splitting over a byte stream.
//!
//! This is a splitter, not a validating decoder. The lead byte's length bits
//! decide how many bytes belong to the character and the bytes pass through
//! untouched: continuation bytes are not checked against the `10xxxxxx`
//! shape, and a stray continuation byte (or invalid lead byte) is emitted
//! alone as a one-byte group. Old terminals did not reject slightly
//! malformed input, and neither does this.

use std::io::{self, Read};

use thiserror::Error;

/// Widest UTF-8 scalar encoding (4 bytes) plus one spare slot, matching the
/// scratch buffer callers are expected to supply.
pub const CHAR_BUF_LEN: usize = 5;

#[derive(Debug, Error)]
pub enum ReadError {
    /// The stream ended after a lead byte promised more continuation bytes.
    /// The partial character is discarded, not emitted.
    #[error("input ended in the middle of a multi-byte character")]
    TruncatedSequence,
    /// The supplied buffer cannot hold the announced sequence. Unreachable
    /// with a [`CHAR_BUF_LEN`]-sized buffer.
    #[error("character buffer too small: sequence needs {needed} bytes, buffer holds {capacity}")]
    BufferTooSmall { needed: usize, capacity: usize },
    #[error("read failed: {0}")]
    Io(#[from] io::Error),
}

/// Splits a byte stream into UTF-8 character groups, one group per call.
///
/// The reader is not restartable: once it reports end of input it stays
/// exhausted, even if the underlying stream would yield more bytes.
#[derive(Debug)]
pub struct CharReader<R> {
    input: R,
    exhausted: bool,
}

impl<R: Read> CharReader<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            exhausted: false,
        }
    }

    /// Read the next character group into `buf`.
    ///
    /// Returns `Ok(Some(len))` with the number of bytes written, or
    /// `Ok(None)` on clean end of input with zero bytes consumed.
    pub fn next_char(&mut self, buf: &mut [u8]) -> Result<Option<usize>, ReadError> {
        if self.exhausted {
            return Ok(None);
        }

        let Some(lead) = self.read_byte()? else {
            self.exhausted = true;
            return Ok(None);
        };

        let len = sequence_len(lead);
        if len > buf.len() {
            return Err(ReadError::BufferTooSmall {
                needed: len,
                capacity: buf.len(),
            });
        }

        buf[0] = lead;
        for slot in &mut buf[1..len] {
            match self.read_byte()? {
                Some(byte) => *slot = byte,
                None => {
                    self.exhausted = true;
                    return Err(ReadError::TruncatedSequence);
                }
            }
        }

        Ok(Some(len))
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = [0_u8; 1];
        loop {
            match self.input.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
    }
}

/// Sequence length announced by a UTF-8 lead byte. Anything that is not a
/// recognized lead pattern counts as length 1 and passes through alone.
const fn sequence_len(lead: u8) -> usize {
    if lead & 0x80 == 0 {
        1
    } else if lead & 0xE0 == 0xC0 {
        2
    } else if lead & 0xF0 == 0xE0 {
        3
    } else if lead & 0xF8 == 0xF0 {
        4
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::{CHAR_BUF_LEN, CharReader, ReadError};
    use std::io::Cursor;

    fn reader(bytes: &[u8]) -> CharReader<Cursor<Vec<u8>>> {
        CharReader::new(Cursor::new(bytes.to_vec()))
    }

    #[test]
    fn ascii_single_byte() {
        let mut r = reader(b"A");
        let mut buf = [0_u8; CHAR_BUF_LEN];
        assert_eq!(r.next_char(&mut buf).unwrap(), Some(1));
        assert_eq!(&buf[..1], b"A");
    }

    #[test]
    fn two_byte_sequence() {
        let mut r = reader("é".as_bytes());
        let mut buf = [0_u8; CHAR_BUF_LEN];
        assert_eq!(r.next_char(&mut buf).unwrap(), Some(2));
        assert_eq!(&buf[..2], "é".as_bytes());
    }

    #[test]
    fn cjk_three_byte_sequence() {
        let mut r = reader("中".as_bytes());
        let mut buf = [0_u8; CHAR_BUF_LEN];
        assert_eq!(r.next_char(&mut buf).unwrap(), Some(3));
        assert_eq!(&buf[..3], "中".as_bytes());
    }

    #[test]
    fn emoji_four_byte_sequence() {
        let mut r = reader("🎉".as_bytes());
        let mut buf = [0_u8; CHAR_BUF_LEN];
        assert_eq!(r.next_char(&mut buf).unwrap(), Some(4));
        assert_eq!(&buf[..4], "🎉".as_bytes());
    }

    #[test]
    fn mixed_stream_splits_per_character() {
        let text = "a中b";
        let mut r = reader(text.as_bytes());
        let mut buf = [0_u8; CHAR_BUF_LEN];
        assert_eq!(r.next_char(&mut buf).unwrap(), Some(1));
        assert_eq!(r.next_char(&mut buf).unwrap(), Some(3));
        assert_eq!(r.next_char(&mut buf).unwrap(), Some(1));
        assert_eq!(&buf[..1], b"b");
        assert_eq!(r.next_char(&mut buf).unwrap(), None);
    }

    #[test]
    fn empty_stream_is_clean_end() {
        let mut r = reader(b"");
        let mut buf = [0_u8; CHAR_BUF_LEN];
        assert_eq!(r.next_char(&mut buf).unwrap(), None);
    }

    #[test]
    fn exhausted_reader_stays_exhausted() {
        let mut r = reader(b"x");
        let mut buf = [0_u8; CHAR_BUF_LEN];
        assert_eq!(r.next_char(&mut buf).unwrap(), Some(1));
        assert_eq!(r.next_char(&mut buf).unwrap(), None);
        assert_eq!(r.next_char(&mut buf).unwrap(), None);
    }

    #[test]
    fn truncated_sequence_is_an_error() {
        // 0xE4 promises a 3-byte sequence; the stream ends first.
        let mut r = reader(&[0xE4]);
        let mut buf = [0_u8; CHAR_BUF_LEN];
        assert!(matches!(
            r.next_char(&mut buf),
            Err(ReadError::TruncatedSequence)
        ));
    }

    #[test]
    fn truncated_mid_continuation() {
        let mut r = reader(&[b'a', 0xE4, 0xB8]);
        let mut buf = [0_u8; CHAR_BUF_LEN];
        assert_eq!(r.next_char(&mut buf).unwrap(), Some(1));
        assert!(matches!(
            r.next_char(&mut buf),
            Err(ReadError::TruncatedSequence)
        ));
    }

    #[test]
    fn stray_continuation_byte_emitted_alone() {
        let mut r = reader(&[0x80, b'a']);
        let mut buf = [0_u8; CHAR_BUF_LEN];
        assert_eq!(r.next_char(&mut buf).unwrap(), Some(1));
        assert_eq!(buf[0], 0x80);
        assert_eq!(r.next_char(&mut buf).unwrap(), Some(1));
        assert_eq!(buf[0], b'a');
    }

    #[test]
    fn continuation_bytes_not_validated() {
        // 2-byte lead followed by a byte that is not 10xxxxxx: passed
        // through as-is, permissive by design.
        let mut r = reader(&[0xC3, b'Z']);
        let mut buf = [0_u8; CHAR_BUF_LEN];
        assert_eq!(r.next_char(&mut buf).unwrap(), Some(2));
        assert_eq!(&buf[..2], &[0xC3, b'Z']);
    }

    #[test]
    fn buffer_too_small() {
        let mut r = reader("中".as_bytes());
        let mut buf = [0_u8; 2];
        assert!(matches!(
            r.next_char(&mut buf),
            Err(ReadError::BufferTooSmall {
                needed: 3,
                capacity: 2
            })
        ));
    }
}
