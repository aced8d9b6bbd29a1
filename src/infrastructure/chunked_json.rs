// Chunked JSON streaming utilities
use crate::infrastructure::dashboard_registry::DashboardEvent;
use async_compression::tokio::bufread::BrotliEncoder;
use axum::body::Body;
use axum::http::{header, Response, StatusCode};
use axum::response::IntoResponse;
use bytes::{BufMut, Bytes, BytesMut};
use futures::stream::Stream;
use futures::StreamExt;
use tokio::io::AsyncReadExt;
use tokio::sync::{broadcast, watch};

/// Create a chunked streaming response. Each chunk is a 4-byte big-endian
/// length followed by one JSON-encoded event, optionally brotli-compressed.
pub async fn chunked_json_stream<S>(
    stream: S,
    compress: bool,
) -> Result<Response<Body>, StatusCode>
where
    S: Stream<Item = DashboardEvent> + Send + 'static,
{
    let byte_stream = stream.then(move |event| async move { serialize_chunk(&event, compress).await });

    let body = Body::from_stream(byte_stream);

    // Chunks are compressed individually, so no Content-Encoding header:
    // clients must not try to decompress the HTTP stream as a whole.
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/x-ndjson-chunked")
        .header(header::TRANSFER_ENCODING, "chunked");

    response
        .body(body)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Serialize a single event to a length-prefixed chunk
pub async fn serialize_chunk(event: &DashboardEvent, compress: bool) -> Result<Bytes, std::io::Error> {
    let json = serde_json::to_vec(event)?;

    let payload = if compress {
        let mut encoder = BrotliEncoder::new(std::io::Cursor::new(json));
        let mut compressed = Vec::new();
        encoder.read_to_end(&mut compressed).await?;
        compressed
    } else {
        json
    };

    let length = payload.len() as u32;
    let mut chunk = BytesMut::with_capacity(4 + payload.len());
    chunk.put_u32(length);
    chunk.put_slice(&payload);

    Ok(chunk.freeze())
}

/// Stream registry events to a client until shutdown. Slow clients skip
/// what they missed.
pub async fn stream_from_receiver(
    mut rx: broadcast::Receiver<DashboardEvent>,
    mut shutdown: watch::Receiver<bool>,
    compress: bool,
) -> impl IntoResponse {
    let stream = async_stream::stream! {
        loop {
            let received = tokio::select! {
                received = rx.recv() => received,
                _ = shutdown.changed() => break,
            };
            match received {
                Ok(event) => yield event,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "dashboard stream lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    };

    match chunked_json_stream(stream, compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}
