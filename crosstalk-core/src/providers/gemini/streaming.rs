//! Streaming support for Gemini responses

use super::types::{Candidate, GeminiContent, GeminiError, GeminiRole, GenerateContentResponse};
use crate::providers::{ChunkStream, ProviderError};
use bytes::Bytes;
use eventsource_stream::{EventStreamError, Eventsource};
use futures::{Stream, StreamExt};
use serde::Deserialize;

/// One `data:` payload of the event stream
#[derive(Deserialize)]
#[serde(untagged)]
enum StreamEvent {
    Error(GeminiError),
    Chunk(GenerateContentResponse),
}

/// Parse the Server-Sent Events stream of `streamGenerateContent?alt=sse`
pub fn parse_stream(
    stream: impl Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static,
) -> ChunkStream {
    let event_stream = stream.eventsource();

    Box::pin(event_stream.filter_map(|result| async move {
        match result {
            Ok(event) => {
                // Gemini sends one complete response object per event
                if event.data.trim().is_empty() {
                    return None;
                }

                match serde_json::from_str::<StreamEvent>(&event.data) {
                    Ok(StreamEvent::Chunk(chunk)) => Some(Ok(chunk)),
                    Ok(StreamEvent::Error(error)) => Some(Err(ProviderError::Api {
                        code: error.error.status,
                        message: error.error.message,
                    })),
                    Err(e) => {
                        tracing::warn!("Stream chunk has an unexpected shape: {}", e);
                        Some(Err(ProviderError::IncompatibleStream(format!(
                            "unexpected chunk shape: {}",
                            e
                        ))))
                    }
                }
            }
            Err(EventStreamError::Transport(e)) => Some(Err(ProviderError::from(e))),
            Err(e) => Some(Err(ProviderError::IncompatibleStream(format!(
                "malformed event stream: {}",
                e
            )))),
        }
    }))
}

/// Folds streamed chunks into the aggregate terminal response
///
/// Candidates are matched by index. Adjacent text parts are merged; every
/// other part is appended in arrival order. The last finish reason and
/// usage metadata seen win.
#[derive(Debug, Default)]
pub struct ResponseAggregator {
    response: GenerateContentResponse,
    chunks: usize,
}

impl ResponseAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one chunk into the aggregate
    pub fn push(&mut self, chunk: GenerateContentResponse) {
        self.chunks += 1;

        for (position, candidate) in chunk.candidates.into_iter().enumerate() {
            let index = candidate.index.unwrap_or(position as u32);
            let slot = self.candidate_slot(index);

            if let Some(content) = candidate.content {
                let target = slot.content.get_or_insert_with(|| GeminiContent {
                    role: Some(GeminiRole::Model),
                    parts: Vec::new(),
                });
                for part in content.parts {
                    match target.parts.last_mut() {
                        Some(last) if last.is_plain_text() && part.is_plain_text() => {
                            if let (Some(existing), Some(text)) = (last.text.as_mut(), part.text) {
                                existing.push_str(&text);
                            }
                        }
                        _ => target.parts.push(part),
                    }
                }
            }

            if candidate.finish_reason.is_some() {
                slot.finish_reason = candidate.finish_reason;
            }
        }

        if chunk.usage_metadata.is_some() {
            self.response.usage_metadata = chunk.usage_metadata;
        }
        if chunk.model_version.is_some() {
            self.response.model_version = chunk.model_version;
        }
    }

    /// Number of chunks folded so far
    pub fn chunk_count(&self) -> usize {
        self.chunks
    }

    /// The aggregate response
    pub fn finish(self) -> GenerateContentResponse {
        self.response
    }

    fn candidate_slot(&mut self, index: u32) -> &mut Candidate {
        let candidates = &mut self.response.candidates;
        let position = match candidates.iter().position(|c| c.index == Some(index)) {
            Some(position) => position,
            None => {
                candidates.push(Candidate {
                    index: Some(index),
                    ..Default::default()
                });
                candidates.len() - 1
            }
        };
        &mut candidates[position]
    }
}
