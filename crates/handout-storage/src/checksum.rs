//! Streaming SHA-256 and byte counting.
//!
//! Content is consumed chunk by chunk as it arrives; nothing here holds
//! more than one chunk in memory.

use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use bytes::Bytes;
use futures::{Stream, StreamExt};
use pin_project_lite::pin_project;
use sha2::{Digest, Sha256};
use tokio_util::io::ReaderStream;

use handout_core::error::AppError;
use handout_core::result::AppResult;

/// Digest and size of a fully consumed byte source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checksum {
    /// Lower-case hex SHA-256.
    pub sha256: String,
    /// Total number of bytes.
    pub size_bytes: u64,
}

pin_project! {
    /// Stream adapter that hashes and counts every chunk passing through it.
    ///
    /// With a limit set, the stream yields `PayloadTooLarge` as soon as the
    /// running total crosses it, without waiting for the source to finish.
    pub struct HashingStream<S> {
        #[pin]
        inner: S,
        hasher: Sha256,
        size_bytes: u64,
        limit: Option<u64>,
        exhausted: bool,
    }
}

impl<S> HashingStream<S> {
    /// Wrap a stream without a size limit.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
            size_bytes: 0,
            limit: None,
            exhausted: false,
        }
    }

    /// Wrap a stream that must not yield more than `max_bytes` in total.
    pub fn with_limit(inner: S, max_bytes: u64) -> Self {
        Self {
            limit: Some(max_bytes),
            ..Self::new(inner)
        }
    }

    /// Bytes seen so far.
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Finish hashing. Only meaningful once the stream returned `None`.
    pub fn finalize(self) -> Checksum {
        Checksum {
            sha256: hex::encode(self.hasher.finalize()),
            size_bytes: self.size_bytes,
        }
    }
}

impl<S> Stream for HashingStream<S>
where
    S: Stream<Item = Result<Bytes, std::io::Error>>,
{
    type Item = AppResult<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        if *this.exhausted {
            return Poll::Ready(None);
        }

        match ready!(this.inner.poll_next(cx)) {
            Some(Ok(chunk)) => {
                *this.size_bytes += chunk.len() as u64;
                if let Some(limit) = *this.limit {
                    if *this.size_bytes > limit {
                        *this.exhausted = true;
                        return Poll::Ready(Some(Err(AppError::payload_too_large(limit))));
                    }
                }
                this.hasher.update(&chunk);
                Poll::Ready(Some(Ok(chunk)))
            }
            Some(Err(e)) => {
                *this.exhausted = true;
                Poll::Ready(Some(Err(AppError::io("Failed to read upload stream", e))))
            }
            None => {
                *this.exhausted = true;
                Poll::Ready(None)
            }
        }
    }
}

/// Consume a byte stream and return its SHA-256 and size.
pub async fn checksum_stream<S>(stream: S) -> AppResult<Checksum>
where
    S: Stream<Item = Result<Bytes, std::io::Error>> + Unpin,
{
    let mut hashing = HashingStream::new(stream);
    while let Some(chunk) = hashing.next().await {
        chunk?;
    }
    Ok(hashing.finalize())
}

/// Read a file in `chunk_size` pieces and return its SHA-256 and size.
pub async fn checksum_file(path: &Path, chunk_size: usize) -> AppResult<Checksum> {
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| AppError::io("Failed to open stored file", e))?;
    checksum_stream(ReaderStream::with_capacity(file, chunk_size)).await
}

#[cfg(test)]
mod tests {
    use futures::stream;

    use super::*;
    use handout_core::error::ErrorKind;

    fn chunks(parts: &[&'static [u8]]) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Unpin + use<> {
        stream::iter(
            parts
                .iter()
                .map(|p| Ok::<_, std::io::Error>(Bytes::from_static(*p)))
                .collect::<Vec<_>>(),
        )
    }

    #[tokio::test]
    async fn test_checksum_matches_known_digest() {
        let checksum = checksum_stream(chunks(&[&b"hello "[..], &b"world"[..]])).await.unwrap();
        assert_eq!(checksum.size_bytes, 11);
        assert_eq!(
            checksum.sha256,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[tokio::test]
    async fn test_empty_stream() {
        let checksum = checksum_stream(chunks(&[])).await.unwrap();
        assert_eq!(checksum.size_bytes, 0);
        assert_eq!(
            checksum.sha256,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[tokio::test]
    async fn test_limit_short_circuits() {
        let source = chunks(&[&b"aaaa"[..], &b"bbbb"[..], &b"cccc"[..]]);
        let mut hashing = HashingStream::with_limit(source, 6);

        assert!(hashing.next().await.unwrap().is_ok());
        let err = hashing.next().await.unwrap().unwrap_err();
        assert_eq!(err.kind, ErrorKind::PayloadTooLarge);
        // The remaining chunk is never pulled.
        assert!(hashing.next().await.is_none());
        assert_eq!(hashing.size_bytes(), 8);
    }

    #[tokio::test]
    async fn test_read_error_propagates() {
        let source = stream::iter(vec![
            Ok(Bytes::from_static(b"abc")),
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "client went away")),
        ]);
        let err = checksum_stream(source).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Io);
    }

    #[tokio::test]
    async fn test_checksum_file_in_small_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        tokio::fs::write(&path, b"hello world").await.unwrap();

        let checksum = checksum_file(&path, 4).await.unwrap();
        assert_eq!(checksum.size_bytes, 11);
        assert_eq!(
            checksum.sha256,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }
}
