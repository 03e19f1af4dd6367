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

use crate::id::ServiceId;

/// Error taxonomy for the manager and the services it hosts.
///
/// The manager never retries and never panics on these; it surfaces them
/// through the future/response channel the caller already holds. Retrying
/// is the consensus layer's or the client's job, not this crate's.
#[derive(Debug, thiserror::Error)]
pub enum MultiplexError {
    /// Envelope bytes did not parse as a valid `ServiceRequest`/`ServiceResponse`,
    /// or a request arrived on the wrong path (e.g. a `command` on the query path).
    #[error("malformed envelope: {0}")]
    Decode(String),

    /// A streaming query addressed a `ServiceId` with no live instance.
    #[error("service {0} is not known")]
    UnknownService(ServiceId),

    /// `create` or `restore` referenced a type the registry has no factory for.
    /// Fatal: replicas without the type cannot deterministically continue.
    #[error("service type `{0}` is not registered")]
    UnknownType(String),

    /// The hosted primitive's own apply logic failed. Propagated verbatim;
    /// the primitive may already have mutated its state.
    #[error("service execution failed: {0}")]
    Service(#[source] anyhow::Error),

    /// The underlying snapshot/restore stream failed.
    #[error("I/O failure during snapshot/restore: {0}")]
    Io(#[from] std::io::Error),
}

impl MultiplexError {
    /// `true` only for errors that make the manager's state machine
    /// undefined across replicas and so must halt apply rather than just
    /// fail the one operation.
    pub fn is_fatal(&self) -> bool {
        matches!(self, MultiplexError::UnknownType(_))
    }
}

impl From<protobuf::ProtobufError> for MultiplexError {
    fn from(err: protobuf::ProtobufError) -> Self {
        MultiplexError::Decode(err.to_string())
    }
}
