//! Newline-delimited JSON over a chunked byte stream.
//!
//! Chunk boundaries are arbitrary: a line may span several chunks and one
//! chunk may hold several lines. Blank lines are skipped. A trailing line
//! without a final newline is still emitted.

use std::fmt::Display;
use std::pin::Pin;

use futures::stream::{self, Stream, StreamExt};
use serde::de::DeserializeOwned;

use layergen_core::application::ports::TransportError;

struct LineState<S> {
    chunks: Pin<Box<S>>,
    buffer: Vec<u8>,
    finished: bool,
}

/// Split a byte-chunk stream into trimmed, non-empty text lines.
pub fn lines<S, B, E>(chunks: S) -> impl Stream<Item = Result<String, TransportError>> + Send
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]>,
    E: Display,
{
    let state = LineState {
        chunks: Box::pin(chunks),
        buffer: Vec::new(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(newline) = state.buffer.iter().position(|byte| *byte == b'\n') {
                let raw: Vec<u8> = state.buffer.drain(..=newline).collect();
                let line = String::from_utf8_lossy(&raw).trim().to_string();
                if line.is_empty() {
                    continue;
                }
                return Some((Ok(line), state));
            }

            if state.finished {
                let rest = std::mem::take(&mut state.buffer);
                let line = String::from_utf8_lossy(&rest).trim().to_string();
                return (!line.is_empty()).then_some((Ok(line), state));
            }

            match state.chunks.next().await {
                Some(Ok(chunk)) => state.buffer.extend_from_slice(chunk.as_ref()),
                Some(Err(err)) => {
                    state.finished = true;
                    state.buffer.clear();
                    return Some((Err(TransportError::Connection(err.to_string())), state));
                }
                None => state.finished = true,
            }
        }
    })
}

/// Decode every line as `T`.
pub fn json_lines<T, S, B, E>(chunks: S) -> impl Stream<Item = Result<T, TransportError>> + Send
where
    T: DeserializeOwned,
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]>,
    E: Display,
{
    lines(chunks).map(|line| {
        let line = line?;
        serde_json::from_str(&line)
            .map_err(|err| TransportError::Decode(format!("{err} in stream line: {line}")))
    })
}
