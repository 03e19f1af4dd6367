// Copyright 2024 The Multiplex Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use async_trait::async_trait;

use crate::error::MultiplexError;

/// What a hosted service writes to during a streaming command or query.
///
/// A well-behaved implementation of `PrimitiveService::apply_command_stream`
/// (or the query variant) calls `next` zero or more times and then exactly
/// one of `complete`/`error`. The manager never reorders or batches these
/// calls; it forwards each one to the outer `ResponseSink` in the order it
/// arrives, re-framed as a `StreamingResponse`.
#[async_trait]
pub trait ChunkSink: Send {
    async fn next(&mut self, chunk: Vec<u8>);
    async fn complete(&mut self);
    async fn error(&mut self, err: MultiplexError);
}

/// One chunk of a streaming response, after the manager has re-framed it.
pub enum StreamingResponse {
    Chunk(Vec<u8>),
    Complete,
    Error(MultiplexError),
}

/// The caller-supplied sink a streaming `apply_*` call writes wrapped
/// responses to. Analogous to `ChunkSink` but one layer up: it speaks in
/// terms of the manager's envelope, not a service's raw payload bytes.
#[async_trait]
pub trait ResponseSink: Send {
    async fn send(&mut self, response: StreamingResponse);
}

/// Adapts a caller's `ResponseSink` into the `ChunkSink` a `PrimitiveService`
/// expects, so the manager can hand services a narrow, payload-only sink
/// while still delivering through the richer outer channel.
pub(crate) struct ManagerSink<'a> {
    outer: &'a mut dyn ResponseSink,
}

impl<'a> ManagerSink<'a> {
    pub(crate) fn new(outer: &'a mut dyn ResponseSink) -> Self {
        Self { outer }
    }
}

#[async_trait]
impl<'a> ChunkSink for ManagerSink<'a> {
    async fn next(&mut self, chunk: Vec<u8>) {
        self.outer.send(StreamingResponse::Chunk(chunk)).await;
    }

    async fn complete(&mut self) {
        self.outer.send(StreamingResponse::Complete).await;
    }

    async fn error(&mut self, err: MultiplexError) {
        self.outer.send(StreamingResponse::Error(err)).await;
    }
}

/// A `ResponseSink` that records every response it receives, in order.
/// Useful for tests that assert on streaming ordering (`spec.md` S6).
#[derive(Default)]
pub struct RecordingSink {
    pub chunks: Vec<Vec<u8>>,
    pub completed: bool,
    pub error: Option<MultiplexError>,
}

#[async_trait]
impl ResponseSink for RecordingSink {
    async fn send(&mut self, response: StreamingResponse) {
        match response {
            StreamingResponse::Chunk(bytes) => self.chunks.push(bytes),
            StreamingResponse::Complete => self.completed = true,
            StreamingResponse::Error(err) => self.error = Some(err),
        }
    }
}
