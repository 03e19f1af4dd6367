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

//! Reference primitives demonstrating the `PrimitiveService` contract.
//! This crate ships exactly one: [`counter::AtomicCounter`]. A map, a lock,
//! or other primitives would live here too, each as its own module
//! registered under its own type tag.

pub mod counter;
