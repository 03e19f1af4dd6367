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

use std::cmp::Ordering;
use std::fmt;

use crate::proto;

/// Identifies one hosted primitive within a single `ServiceManager`.
///
/// Equality is structural over both fields. Ordering is deliberately *not*
/// derived in field-declaration order: services are sorted by
/// `(service_type, name)` wherever a deterministic order is required
/// (metadata listings, snapshot layout), so `Ord` is implemented by hand to
/// match that key rather than `(name, service_type)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceId {
    pub name: String,
    pub service_type: String,
}

impl ServiceId {
    pub fn new(name: impl Into<String>, service_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            service_type: service_type.into(),
        }
    }

    fn sort_key(&self) -> (&str, &str) {
        (&self.service_type, &self.name)
    }
}

impl PartialOrd for ServiceId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ServiceId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.service_type, self.name)
    }
}

impl From<&ServiceId> for proto::ServiceId {
    fn from(id: &ServiceId) -> Self {
        let mut proto_id = proto::ServiceId::new();
        proto_id.set_name(id.name.clone());
        proto_id.set_service_type(id.service_type.clone());
        proto_id
    }
}

impl From<&proto::ServiceId> for ServiceId {
    fn from(proto_id: &proto::ServiceId) -> Self {
        ServiceId::new(proto_id.get_name(), proto_id.get_service_type())
    }
}
