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

use std::collections::HashMap;

use crate::{error::MultiplexError, service::PrimitiveService};

type Factory = Box<dyn Fn() -> Box<dyn PrimitiveService> + Send + Sync>;

/// Maps a service type tag to a factory that produces fresh
/// `PrimitiveService` instances. Static across the lifetime of a manager:
/// adding types at runtime is out of scope, matching `spec.md` §4.3.
#[derive(Default)]
pub struct ServiceTypeRegistry {
    factories: HashMap<String, Factory>,
}

impl ServiceTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory under `type_tag`. Overwrites any prior factory
    /// for the same tag; callers are expected to register each type once.
    pub fn register<F>(&mut self, type_tag: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Box<dyn PrimitiveService> + Send + Sync + 'static,
    {
        self.factories.insert(type_tag.into(), Box::new(factory));
        self
    }

    pub fn get_service_type(&self, type_tag: &str) -> Option<&Factory> {
        self.factories.get(type_tag)
    }

    /// Looks up `type_tag` and produces a fresh instance, or
    /// `MultiplexError::UnknownType`: a fatal, replica-deterministic error.
    pub fn create(&self, type_tag: &str) -> Result<Box<dyn PrimitiveService>, MultiplexError> {
        self.get_service_type(type_tag).map(|factory| factory()).ok_or_else(|| {
            log::error!("service type `{}` has no registered factory", type_tag);
            MultiplexError::UnknownType(type_tag.to_owned())
        })
    }
}
