//! Wire encoding for the dataset endpoint: JSON, gzipped, delivered as a
//! lazy sequence of byte chunks so the HTTP layer can drain it with
//! backpressure instead of holding one giant body write.

use std::convert::Infallible;
use std::io::{Read, Write};

use bytes::Bytes;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use futures::Stream;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::ServiceError;

/// A fully compressed response body, ready to be chunked out.
#[derive(Debug, Clone)]
pub struct GzipPayload {
    bytes: Bytes,
}

impl GzipPayload {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Split the payload into chunks of at most `chunk_bytes`, lazily.
    pub fn into_chunks(self, chunk_bytes: usize) -> impl Iterator<Item = Bytes> {
        let size = chunk_bytes.max(1);
        let mut rest = self.bytes;
        std::iter::from_fn(move || {
            if rest.is_empty() {
                None
            } else {
                Some(rest.split_to(size.min(rest.len())))
            }
        })
    }

    /// Chunk stream for an HTTP body; the connection drains it until
    /// exhausted, then the response completes.
    pub fn into_stream(
        self,
        chunk_bytes: usize,
    ) -> impl Stream<Item = Result<Bytes, Infallible>> + Send {
        let chunks: Vec<_> = self.into_chunks(chunk_bytes).map(Ok).collect();
        tokio_stream::iter(chunks)
    }
}

/// Serialize `value` as JSON and gzip it in one pass.
pub fn encode<T: Serialize>(value: &T) -> Result<GzipPayload, ServiceError> {
    let json = serde_json::to_vec(value).map_err(|e| ServiceError::Serialization(e.to_string()))?;

    let mut encoder = GzEncoder::new(Vec::with_capacity(json.len() / 4), Compression::default());
    encoder
        .write_all(&json)
        .and_then(|_| encoder.finish())
        .map(|compressed| {
            debug!(
                raw_bytes = json.len(),
                compressed_bytes = compressed.len(),
                "encoded payload"
            );
            GzipPayload {
                bytes: Bytes::from(compressed),
            }
        })
        .map_err(|e| ServiceError::Internal(format!("gzip encoding failed: {e}")))
}

/// Gunzip and deserialize a payload; what the dashboard client does after
/// reassembling the chunk stream, and what the round-trip tests lean on.
pub fn decode<T: DeserializeOwned>(compressed: &[u8]) -> Result<T, ServiceError> {
    let mut json = Vec::new();
    GzDecoder::new(compressed)
        .read_to_end(&mut json)
        .map_err(|e| ServiceError::Internal(format!("gzip decoding failed: {e}")))?;
    serde_json::from_slice(&json).map_err(|e| ServiceError::Serialization(e.to_string()))
}
