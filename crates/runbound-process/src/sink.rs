//! Bounded capture sink

/// Append-only byte sink with a capacity cap.
///
/// `write` always consumes the whole chunk from the producer's point of
/// view; bytes past the capacity count toward `written` but are never
/// stored, and the truncated flag never resets once set. Each stream gets
/// its own sink and a single pump writes to it, so no synchronization is
/// needed.
#[derive(Debug)]
pub struct BoundedSink {
    buf: Vec<u8>,
    limit: i64,
    written: i64,
    truncated: bool,
}

impl BoundedSink {
    /// Create a sink capped at `limit` bytes (`<= 0` = unbounded).
    pub fn new(limit: i64) -> Self {
        Self {
            buf: Vec::new(),
            limit,
            written: 0,
            truncated: false,
        }
    }

    /// Append a chunk, storing at most the remaining room.
    pub fn write(&mut self, chunk: &[u8]) {
        let len = chunk.len() as i64;
        if self.limit <= 0 {
            self.buf.extend_from_slice(chunk);
            self.written += len;
            return;
        }

        let remaining = self.limit - self.written;
        self.written += len;
        if remaining <= 0 {
            self.truncated = true;
            return;
        }
        if len > remaining {
            self.buf.extend_from_slice(&chunk[..remaining as usize]);
            self.truncated = true;
            return;
        }
        self.buf.extend_from_slice(chunk);
    }

    /// Bytes actually stored.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Total bytes offered by the producer, stored or not.
    pub fn written(&self) -> i64 {
        self.written
    }

    /// Whether any byte was dropped.
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// Stored bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consume the sink into lossy UTF-8 text.
    pub fn into_string(self) -> String {
        String::from_utf8_lossy(&self.buf).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_everything_under_limit() {
        let mut sink = BoundedSink::new(10);
        sink.write(b"hello");
        assert_eq!(sink.as_bytes(), b"hello");
        assert_eq!(sink.written(), 5);
        assert!(!sink.truncated());
    }

    #[test]
    fn exact_fit_is_not_truncation() {
        let mut sink = BoundedSink::new(5);
        sink.write(b"hello");
        assert_eq!(sink.len(), 5);
        assert!(!sink.truncated());
    }

    #[test]
    fn oversized_chunk_keeps_prefix() {
        let mut sink = BoundedSink::new(10);
        sink.write(b"abcdefghijklmnopqrstuvwxyz");
        assert_eq!(sink.as_bytes(), b"abcdefghij");
        assert_eq!(sink.written(), 26);
        assert!(sink.truncated());
    }

    #[test]
    fn writes_after_full_are_counted_not_stored() {
        let mut sink = BoundedSink::new(4);
        sink.write(b"full");
        sink.write(b"more");
        assert_eq!(sink.as_bytes(), b"full");
        assert_eq!(sink.written(), 8);
        assert!(sink.truncated());
    }

    #[test]
    fn truncation_is_monotonic() {
        let mut sink = BoundedSink::new(2);
        sink.write(b"abc");
        assert!(sink.truncated());
        sink.write(b"");
        sink.write(b"d");
        assert!(sink.truncated());
    }

    #[test]
    fn zero_or_negative_limit_is_unbounded() {
        for limit in [0, -1] {
            let mut sink = BoundedSink::new(limit);
            sink.write(&[b'x'; 4096]);
            sink.write(&[b'y'; 4096]);
            assert_eq!(sink.len(), 8192);
            assert_eq!(sink.written(), 8192);
            assert!(!sink.truncated());
        }
    }

    #[test]
    fn chunking_does_not_change_final_state() {
        let data: Vec<u8> = (0..=255u8).collect();
        for limit in [1i64, 10, 100, 256, 300] {
            let mut whole = BoundedSink::new(limit);
            whole.write(&data);

            let mut pieces = BoundedSink::new(limit);
            for chunk in data.chunks(7) {
                pieces.write(chunk);
            }

            assert_eq!(whole.as_bytes(), pieces.as_bytes());
            assert_eq!(whole.written(), pieces.written());
            assert_eq!(whole.truncated(), pieces.truncated());
        }
    }
}
