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

//! Generated protobuf message types for the envelope and counter schemas.
//!
//! `envelope.rs` and `counter.rs` are produced into `OUT_DIR` by `build.rs`
//! from the `.proto` files under `schema/`, using `protobuf-codegen-pure` so
//! the build never shells out to a system `protoc`.

include!(concat!(env!("OUT_DIR"), "/proto_gen_mod.rs"));

pub use envelope_gen::{
    CommandRequest, CommandResponse, CreateRequest, CreateResponse, DeleteRequest,
    DeleteResponse, MetadataRequest, MetadataResponse, QueryRequest, QueryResponse, ServiceId,
    ServiceRequest, ServiceRequest_oneof_kind, ServiceResponse, ServiceResponse_oneof_kind,
};
pub use counter_gen::{
    CheckAndSetOp, CheckAndSetResult, CounterRequest, CounterRequest_oneof_op, CounterResponse,
    CounterResponse_oneof_result, CounterSnapshot, DecrementOp, DecrementResult, GetOp, GetResult,
    IncrementOp, IncrementResult, SetOp, SetResult,
};
