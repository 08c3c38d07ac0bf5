//! Incremental UTF-8 decoding of the reply body.
//!
//! The backend streams raw text and the transport chunks it on byte
//! boundaries, so a multi-byte character (every Amharic syllable is three
//! bytes) can arrive split across two chunks. The decoder holds back an
//! incomplete trailing sequence until the rest of it arrives.

pub(crate) struct Utf8Decoder {
    buf: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Decode everything decodable from the bytes received so far.
    ///
    /// Invalid sequences become U+FFFD; an incomplete sequence at the end of
    /// the buffer is kept for the next call.
    pub fn feed(&mut self, bytes: &[u8]) -> String {
        self.buf.extend_from_slice(bytes);

        let mut out = String::new();
        let mut consumed = 0;
        loop {
            match std::str::from_utf8(&self.buf[consumed..]) {
                Ok(valid) => {
                    out.push_str(valid);
                    consumed = self.buf.len();
                    break;
                }
                Err(err) => {
                    let valid_up_to = err.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(
                        &self.buf[consumed..consumed + valid_up_to],
                    ));
                    consumed += valid_up_to;
                    match err.error_len() {
                        Some(invalid) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            consumed += invalid;
                        }
                        // Incomplete sequence at the end: wait for more bytes.
                        None => break,
                    }
                }
            }
        }
        self.buf.drain(..consumed);
        out
    }

    /// Flush whatever is left once the transport signals completion.
    pub fn finish(self) -> String {
        if self.buf.is_empty() {
            String::new()
        } else {
            String::from_utf8_lossy(&self.buf).into_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_passes_through() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.feed(b"Hello "), "Hello ");
        assert_eq!(decoder.feed(b"world"), "world");
        assert_eq!(decoder.finish(), "");
    }

    #[test]
    fn test_multibyte_split_across_chunks() {
        // "ሰላም" is nine bytes; split inside the second syllable.
        let bytes = "ሰላም".as_bytes();
        let mut decoder = Utf8Decoder::new();
        let first = decoder.feed(&bytes[..4]);
        let second = decoder.feed(&bytes[4..]);
        assert_eq!(format!("{first}{second}"), "ሰላም");
        // The split chunk alone must not emit a partial character.
        assert_eq!(first, "ሰ");
    }

    #[test]
    fn test_split_at_every_boundary() {
        let text = "ጤና ይስጥልኝ! Hello";
        let bytes = text.as_bytes();
        for split in 0..=bytes.len() {
            let mut decoder = Utf8Decoder::new();
            let mut out = decoder.feed(&bytes[..split]);
            out.push_str(&decoder.feed(&bytes[split..]));
            out.push_str(&decoder.finish());
            assert_eq!(out, text, "split at byte {split}");
        }
    }

    #[test]
    fn test_invalid_bytes_become_replacement() {
        let mut decoder = Utf8Decoder::new();
        let out = decoder.feed(&[b'a', 0xFF, b'b']);
        assert_eq!(out, "a\u{FFFD}b");
    }

    #[test]
    fn test_truncated_tail_flushed_lossily() {
        let bytes = "ም".as_bytes();
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.feed(&bytes[..2]), "");
        assert_eq!(decoder.finish(), "\u{FFFD}");
    }
}
