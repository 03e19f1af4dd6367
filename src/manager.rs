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

//! The multiplexer itself: routes every inbound envelope to a hosted
//! service instance, handling create/delete/metadata inline and
//! aggregating snapshot/restore/garbage-collection across the whole set.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use protobuf::{CodedInputStream, Message};

use crate::{
    context::{Context, OperationKind},
    envelope::{self, RequestKind, ResponseKind},
    error::MultiplexError,
    id::ServiceId,
    instance::ServiceInstance,
    proto,
    registry::ServiceTypeRegistry,
    sink::{ManagerSink, ResponseSink, StreamingResponse},
};

/// Owns the live set of service instances and routes every inbound envelope
/// to the right one. Driven by the consensus layer's single-threaded apply
/// loop: callers must not invoke `apply_*` again before the previous call's
/// future has resolved, which Rust's `&mut self` borrow already enforces
/// for any single owner of the manager.
pub struct ServiceManager {
    registry: ServiceTypeRegistry,
    // Keyed and iterated in `(service_type, name)` order via `ServiceId`'s
    // hand-written `Ord`, so snapshot layout and metadata listings are
    // deterministic by construction rather than by a separate sort step.
    services: BTreeMap<ServiceId, ServiceInstance>,
}

impl ServiceManager {
    pub fn new(registry: ServiceTypeRegistry) -> Self {
        Self {
            registry,
            services: BTreeMap::new(),
        }
    }

    /// Number of currently live service instances. Mostly useful in tests.
    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    fn create_instance(
        &self,
        id: &ServiceId,
        ctx: &Context,
    ) -> Result<ServiceInstance, MultiplexError> {
        let service = self.registry.create(&id.service_type)?;
        Ok(ServiceInstance::create(id.clone(), service, ctx))
    }

    /// Implements the implicit-creation rule of `spec.md` §4.5 step 3: a
    /// command or streaming-command addressed to a fresh id creates it.
    /// Does *not* apply to queries; see `apply_query`/`apply_query_stream`.
    fn ensure_instance(
        &mut self,
        id: &ServiceId,
        ctx: &Context,
    ) -> Result<&mut ServiceInstance, MultiplexError> {
        if !self.services.contains_key(id) {
            let instance = self.create_instance(id, ctx)?;
            log::debug!("implicitly created service {} on first command", id);
            self.services.insert(id.clone(), instance);
        }
        Ok(self.services.get_mut(id).expect("just inserted or present"))
    }

    fn list_services(&self, type_filter: Option<&str>) -> Vec<ServiceId> {
        self.services
            .keys()
            .filter(|id| type_filter.map_or(true, |t| id.service_type == t))
            .cloned()
            .collect()
    }

    /// Routes a non-streaming `command` envelope. `create`/`delete` are
    /// handled inline here too, matching `spec.md` §4.5.
    pub async fn apply_command(
        &mut self,
        index: u64,
        tick: u64,
        bytes: &[u8],
    ) -> Result<Vec<u8>, MultiplexError> {
        let (id, kind) = envelope::decode_request(bytes)?;
        let ctx = Context::new(index, tick, OperationKind::Command);

        let response = match kind {
            RequestKind::Create => {
                self.ensure_instance(&id, &ctx)?;
                log::debug!("created service {}", id);
                ResponseKind::Create
            }
            RequestKind::Delete => {
                if self.services.remove(&id).is_some() {
                    log::debug!("deleted service {}", id);
                } else {
                    log::debug!("delete of unknown service {} is a no-op", id);
                }
                ResponseKind::Delete
            }
            RequestKind::Command { payload } => {
                let instance = self.ensure_instance(&id, &ctx)?;
                let payload = instance.apply_command(&ctx, &payload).await?;
                ResponseKind::Command { payload }
            }
            RequestKind::Metadata { .. } | RequestKind::Query { .. } => {
                return Err(MultiplexError::Decode(
                    "metadata/query requests are not valid on the command path".to_owned(),
                ))
            }
        };

        Ok(envelope::encode_response(response))
    }

    /// Routes a non-streaming `query` envelope (`metadata` or `query`).
    pub async fn apply_query(
        &mut self,
        index: u64,
        tick: u64,
        bytes: &[u8],
    ) -> Result<Vec<u8>, MultiplexError> {
        let (id, kind) = envelope::decode_request(bytes)?;
        let ctx = Context::new(index, tick, OperationKind::Query);

        let response = match kind {
            RequestKind::Metadata { type_filter } => ResponseKind::Metadata {
                services: self.list_services(type_filter.as_deref()),
            },
            RequestKind::Query { payload } => {
                let payload = if let Some(instance) = self.services.get(&id) {
                    instance.apply_query(&ctx, &payload).await?
                } else {
                    // Transient: created for this read only, then discarded.
                    // The non-streaming query path is the one place the
                    // manager is allowed to do this (spec.md §4.5).
                    let transient = self.create_instance(&id, &ctx)?;
                    transient.apply_query(&ctx, &payload).await?
                };
                ResponseKind::Query { payload }
            }
            RequestKind::Create | RequestKind::Delete | RequestKind::Command { .. } => {
                return Err(MultiplexError::Decode(
                    "create/delete/command requests are not valid on the query path".to_owned(),
                ))
            }
        };

        Ok(envelope::encode_response(response))
    }

    /// Streaming command variant. Implicit creation still applies.
    pub async fn apply_command_stream(
        &mut self,
        index: u64,
        tick: u64,
        bytes: &[u8],
        sink: &mut dyn ResponseSink,
    ) {
        let ctx = Context::new(index, tick, OperationKind::Command);
        match envelope::decode_request(bytes) {
            Ok((id, RequestKind::Command { payload })) => {
                match self.ensure_instance(&id, &ctx) {
                    Ok(instance) => {
                        let mut forward = ManagerSink::new(sink);
                        instance
                            .apply_command_stream(&ctx, &payload, &mut forward)
                            .await;
                    }
                    Err(err) => sink.send(StreamingResponse::Error(err)).await,
                }
            }
            Ok(_) => {
                sink.send(StreamingResponse::Error(MultiplexError::Decode(
                    "streaming command path requires a `command` request".to_owned(),
                )))
                .await
            }
            Err(err) => sink.send(StreamingResponse::Error(err)).await,
        }
    }

    /// Streaming query variant. Unlike the non-streaming path, an absent
    /// id fails with `UnknownService` rather than creating a transient
    /// instance: implicit creation during a streaming call could leak a
    /// partially-initialized instance into the committed set.
    pub async fn apply_query_stream(
        &mut self,
        index: u64,
        tick: u64,
        bytes: &[u8],
        sink: &mut dyn ResponseSink,
    ) {
        let ctx = Context::new(index, tick, OperationKind::Query);
        match envelope::decode_request(bytes) {
            Ok((id, RequestKind::Query { payload })) => match self.services.get(&id) {
                Some(instance) => {
                    let mut forward = ManagerSink::new(sink);
                    instance
                        .apply_query_stream(&ctx, &payload, &mut forward)
                        .await;
                }
                None => {
                    sink.send(StreamingResponse::Error(
                        MultiplexError::UnknownService(id),
                    ))
                    .await
                }
            },
            Ok(_) => {
                sink.send(StreamingResponse::Error(MultiplexError::Decode(
                    "streaming query path requires a `query` request".to_owned(),
                )))
                .await
            }
            Err(err) => sink.send(StreamingResponse::Error(err)).await,
        }
    }

    /// Writes, for each live service in `(service_type, name)` order, a
    /// length-delimited `ServiceId` record followed by that service's own
    /// self-delimiting snapshot bytes.
    pub fn snapshot(&self, output: &mut dyn Write) -> Result<(), MultiplexError> {
        for (id, instance) in &self.services {
            let proto_id = proto::ServiceId::from(id);
            proto_id.write_length_delimited_to_writer(output)?;
            instance.snapshot(output)?;
        }
        Ok(())
    }

    /// Replaces the entire service set by reading back a `snapshot()`
    /// stream record by record until `source` is exhausted.
    ///
    /// Reads through a single `CodedInputStream` for the whole loop rather
    /// than building a fresh one per record: a `CodedInputStream` wrapping a
    /// reader buffers ahead of the message it is asked to parse, so a
    /// short-lived one dropped after each `ServiceId`/snapshot pair would
    /// discard bytes the next record needs. `read_message` reads exactly a
    /// length-prefixed message off the shared stream and advances it in
    /// place, which both this loop and each service's own `restore` rely on.
    pub fn restore(&mut self, source: &mut dyn Read) -> Result<(), MultiplexError> {
        self.services.clear();
        let mut input = CodedInputStream::new(source);
        while !input.eof()? {
            let proto_id: proto::ServiceId = input.read_message()?;
            let id = ServiceId::from(&proto_id);

            let init_ctx = Context::new(0, 0, OperationKind::Command);
            let mut instance = self.create_instance(&id, &init_ctx)?;
            instance.restore(&mut input)?;
            self.services.insert(id, instance);
        }
        Ok(())
    }

    /// Conjunction across all hosted instances: a single instance
    /// withholding consent blocks log truncation at `index`.
    pub fn can_delete(&self, index: u64) -> bool {
        let verdict = self
            .services
            .values()
            .all(|instance| instance.can_delete(index));
        log::trace!("can_delete({}) = {}", index, verdict);
        verdict
    }
}
