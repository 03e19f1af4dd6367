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

/// Whether the in-flight operation is allowed to mutate service state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Command,
    Query,
}

/// Read-only view the manager hands to every hosted service on every call.
///
/// Built fresh per `apply_*` invocation from values the consensus layer
/// supplies, never read from a local clock or counter: determinism requires
/// that two replicas applying the same command see byte-identical contexts.
#[derive(Debug, Clone, Copy)]
pub struct Context {
    /// Log index of the entry currently being applied.
    pub index: u64,
    /// Opaque, consensus-supplied logical clock; never `SystemTime::now()`.
    pub tick: u64,
    pub kind: OperationKind,
}

impl Context {
    pub fn new(index: u64, tick: u64, kind: OperationKind) -> Self {
        Self { index, tick, kind }
    }

    pub fn is_command(&self) -> bool {
        self.kind == OperationKind::Command
    }
}
