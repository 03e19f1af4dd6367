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

use protobuf::CodedInputStream;

use crate::{
    context::Context,
    error::MultiplexError,
    id::ServiceId,
    service::PrimitiveService,
    sink::ChunkSink,
};

/// Binds one `PrimitiveService` to its identity. A thin pass-through for
/// apply/snapshot/restore/can-delete; the unit the `ServiceManager` owns and
/// can drop. Creating one calls `init` on the underlying primitive, both on
/// the normal insertion path and the restore path.
pub struct ServiceInstance {
    id: ServiceId,
    service: Box<dyn PrimitiveService>,
}

impl ServiceInstance {
    pub(crate) fn create(
        id: ServiceId,
        mut service: Box<dyn PrimitiveService>,
        ctx: &Context,
    ) -> Self {
        service.init(ctx);
        Self { id, service }
    }

    pub fn id(&self) -> &ServiceId {
        &self.id
    }

    pub(crate) async fn apply_command(
        &mut self,
        ctx: &Context,
        payload: &[u8],
    ) -> Result<Vec<u8>, MultiplexError> {
        self.service.apply_command(ctx, payload).await
    }

    pub(crate) async fn apply_command_stream(
        &mut self,
        ctx: &Context,
        payload: &[u8],
        sink: &mut dyn ChunkSink,
    ) {
        self.service.apply_command_stream(ctx, payload, sink).await
    }

    pub(crate) async fn apply_query(
        &self,
        ctx: &Context,
        payload: &[u8],
    ) -> Result<Vec<u8>, MultiplexError> {
        self.service.apply_query(ctx, payload).await
    }

    pub(crate) async fn apply_query_stream(
        &self,
        ctx: &Context,
        payload: &[u8],
        sink: &mut dyn ChunkSink,
    ) {
        self.service.apply_query_stream(ctx, payload, sink).await
    }

    pub(crate) fn snapshot(&self, output: &mut dyn Write) -> Result<(), MultiplexError> {
        self.service.snapshot(output)
    }

    pub(crate) fn restore(&mut self, input: &mut CodedInputStream<'_>) -> Result<(), MultiplexError> {
        self.service.restore(input)
    }

    pub(crate) fn can_delete(&self, index: u64) -> bool {
        self.service.can_delete(index)
    }
}
