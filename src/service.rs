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

use std::io::Write;

use async_trait::async_trait;
use protobuf::CodedInputStream;

use crate::{context::Context, error::MultiplexError, sink::ChunkSink};

/// The capability set every hosted primitive (counter, map, lock, ...) must
/// implement. Dispatch onto one of these is a `match` on a request's
/// sub-kind tag, not reflection: see the tagged `RequestKind`/`ResponseKind`
/// enums in `envelope.rs`.
///
/// Determinism requirement: for identical command sequences starting from
/// identical snapshots, every implementation must produce byte-identical
/// responses and byte-identical snapshots. No wall-clock reads, no
/// randomness, no iteration over unordered collections without an explicit
/// ordering.
#[async_trait]
pub trait PrimitiveService: Send + Sync {
    /// Called once, right after the instance is created: both on the
    /// normal `apply()` path and when recreated during `restore()`. Plain
    /// (non-async) because initialization never needs to suspend; only the
    /// mutating/querying operations do.
    fn init(&mut self, _ctx: &Context) {}

    /// Mutating. May alter state, never perform I/O.
    async fn apply_command(
        &mut self,
        ctx: &Context,
        payload: &[u8],
    ) -> Result<Vec<u8>, MultiplexError>;

    /// Mutating streaming variant. Default delegates to `apply_command` and
    /// reports its single result as one chunk followed by `complete`, or as
    /// `error` if it failed: satisfies "exactly one terminal call" with no
    /// extra work for services that have nothing to stream.
    async fn apply_command_stream(
        &mut self,
        ctx: &Context,
        payload: &[u8],
        sink: &mut dyn ChunkSink,
    ) {
        match self.apply_command(ctx, payload).await {
            Ok(bytes) => {
                sink.next(bytes).await;
                sink.complete().await;
            }
            Err(err) => sink.error(err).await,
        }
    }

    /// Non-mutating. Must not alter any state visible to a subsequent snapshot.
    async fn apply_query(&self, ctx: &Context, payload: &[u8]) -> Result<Vec<u8>, MultiplexError>;

    /// Non-mutating streaming variant; same default behavior as the command one.
    async fn apply_query_stream(&self, ctx: &Context, payload: &[u8], sink: &mut dyn ChunkSink) {
        match self.apply_query(ctx, payload).await {
            Ok(bytes) => {
                sink.next(bytes).await;
                sink.complete().await;
            }
            Err(err) => sink.error(err).await,
        }
    }

    /// Write a deterministic, self-delimiting representation of the current
    /// state. The manager does not impose any framing around these bytes
    /// beyond the length-delimited `ServiceId` record that precedes them.
    fn snapshot(&self, output: &mut dyn Write) -> Result<(), MultiplexError>;

    /// Read back a `snapshot()`, replacing all state. Must consume exactly
    /// the bytes this service's own `snapshot()` wrote, leaving `input`
    /// positioned at the next record (or EOF). Takes the manager's single
    /// shared `CodedInputStream` rather than a fresh one per call, since a
    /// `CodedInputStream` constructed around a reader buffers ahead of the
    /// current record; reusing one instance across the whole restore loop is
    /// the only way to avoid losing the bytes of the next record.
    fn restore(&mut self, input: &mut CodedInputStream<'_>) -> Result<(), MultiplexError>;

    /// `true` iff all state up to and including `index` is no longer needed
    /// for correctness. Monotonic: once true for `i`, stays true for all
    /// `j >= i` unless new state at `j` is produced.
    fn can_delete(&self, index: u64) -> bool;
}
