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

//! A deterministic multiplexer that hosts many independent primitive state
//! machines (counters, maps, locks, ...) behind a single replicated log.
//!
//! A consensus layer outside this crate feeds [`ServiceManager`] an ordered
//! stream of commands and queries, each carrying opaque bytes; the manager
//! routes them to a per-primitive [`PrimitiveService`] instance, returns
//! opaque bytes back, and supports full snapshot/restore so a follower or
//! recovering replica can reconstruct identical state.
//!
//! See [`primitives::counter::AtomicCounter`] for a complete example of the
//! [`PrimitiveService`] contract.

pub mod context;
pub mod envelope;
pub mod error;
pub mod id;
mod instance;
pub mod primitives;
mod proto;
pub mod registry;
pub mod service;
pub mod sink;

mod manager;

pub use context::{Context, OperationKind};
pub use envelope::{RequestKind, ResponseKind};
pub use error::MultiplexError;
pub use id::ServiceId;
pub use manager::ServiceManager;
pub use registry::ServiceTypeRegistry;
pub use service::PrimitiveService;
pub use sink::{ChunkSink, RecordingSink, ResponseSink, StreamingResponse};
