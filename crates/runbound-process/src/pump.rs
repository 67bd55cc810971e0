//! Per-stream output pump

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tracing::warn;

use crate::config::OutputWriter;
use crate::sink::BoundedSink;

/// Bytes per read from the child pipe.
const READ_CHUNK_SIZE: usize = 8192;

/// Drain one child stream into its capture sink and optional external
/// writer.
///
/// The external writer sees every byte regardless of the sink's capacity;
/// if it fails it is dropped and capture continues. Returns the sink once
/// the stream reaches EOF, so sink state is only observable after the pump
/// task is joined.
pub(crate) async fn pump<R>(
    stream: &'static str,
    reader: Option<R>,
    mut sink: BoundedSink,
    mut external: Option<OutputWriter>,
) -> BoundedSink
where
    R: AsyncRead + Unpin,
{
    let Some(mut reader) = reader else {
        return sink;
    };

    let mut chunk = [0u8; READ_CHUNK_SIZE];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                sink.write(&chunk[..n]);
                if let Some(writer) = external.as_mut() {
                    if let Err(error) = writer.write_all(&chunk[..n]).await {
                        warn!(stream, %error, "external writer failed, dropping it");
                        external = None;
                    }
                }
            }
            Err(error) => {
                warn!(stream, %error, "failed to read child stream");
                break;
            }
        }
    }

    if let Some(writer) = external.as_mut() {
        let _ = writer.flush().await;
    }
    sink
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use tokio::io::AsyncReadExt;

    use super::*;

    #[tokio::test]
    async fn captures_and_tees() {
        let data = b"abcdefghijklmnopqrstuvwxyz".to_vec();
        let (tx, mut rx) = tokio::io::duplex(8);

        let handle = tokio::spawn(pump(
            "stdout",
            Some(Cursor::new(data.clone())),
            BoundedSink::new(10),
            Some(Box::new(tx) as OutputWriter),
        ));

        let mut seen = Vec::new();
        rx.read_to_end(&mut seen).await.unwrap();
        let sink = handle.await.unwrap();

        // The tee is never capacity-limited; only the sink is.
        assert_eq!(seen, data);
        assert_eq!(sink.as_bytes(), b"abcdefghij");
        assert!(sink.truncated());
    }

    #[tokio::test]
    async fn missing_stream_returns_empty_sink() {
        let sink = pump("stderr", None::<Cursor<Vec<u8>>>, BoundedSink::new(10), None).await;
        assert!(sink.is_empty());
        assert!(!sink.truncated());
    }

    #[tokio::test]
    async fn failed_external_writer_does_not_stop_capture() {
        let data = vec![b'x'; 64];
        let (tx, rx) = tokio::io::duplex(8);
        // Closing the read side makes every write fail.
        drop(rx);

        let sink = pump(
            "stdout",
            Some(Cursor::new(data)),
            BoundedSink::new(0),
            Some(Box::new(tx) as OutputWriter),
        )
        .await;

        assert_eq!(sink.len(), 64);
        assert!(!sink.truncated());
    }
}
