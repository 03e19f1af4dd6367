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

//! A 64-bit signed counter: the reference primitive every other hosted
//! service contract is measured against.

use std::io::Write;

use async_trait::async_trait;
use protobuf::{CodedInputStream, Message};

use crate::{
    context::Context,
    error::MultiplexError,
    proto::{
        self, CounterRequest_oneof_op as Op, CounterResponse_oneof_result as ResultKind,
    },
    service::PrimitiveService,
};

/// Type tag this primitive registers under in a `ServiceTypeRegistry`.
pub const SERVICE_TYPE: &str = "counter";

/// Single signed 64-bit value, initial `0`. All arithmetic wraps rather than
/// panicking or erroring; that is the defined semantics, not a bug.
#[derive(Debug, Default)]
pub struct AtomicCounter {
    value: i64,
}

impl AtomicCounter {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PrimitiveService for AtomicCounter {
    async fn apply_command(
        &mut self,
        ctx: &Context,
        payload: &[u8],
    ) -> Result<Vec<u8>, MultiplexError> {
        let request = proto::CounterRequest::parse_from_bytes(payload)?;
        let mut response = proto::CounterResponse::new();
        response.set_index(ctx.index);

        response.result = Some(match request.op {
            Some(Op::set(set)) => {
                let previous = self.value;
                self.value = set.value;
                let mut result = proto::SetResult::new();
                result.set_previous(previous);
                ResultKind::set(result)
            }
            Some(Op::check_and_set(cas)) => {
                let succeeded = self.value == cas.expect;
                if succeeded {
                    self.value = cas.update;
                }
                let mut result = proto::CheckAndSetResult::new();
                result.set_succeeded(succeeded);
                ResultKind::check_and_set(result)
            }
            Some(Op::increment(inc)) => {
                let previous = self.value;
                let delta = if inc.delta == 0 { 1 } else { inc.delta };
                self.value = self.value.wrapping_add(delta);
                let mut result = proto::IncrementResult::new();
                result.set_previous(previous);
                result.set_next(self.value);
                ResultKind::increment(result)
            }
            Some(Op::decrement(dec)) => {
                let previous = self.value;
                let delta = if dec.delta == 0 { 1 } else { dec.delta };
                self.value = self.value.wrapping_sub(delta);
                let mut result = proto::DecrementResult::new();
                result.set_previous(previous);
                result.set_next(self.value);
                ResultKind::decrement(result)
            }
            Some(Op::get(_)) | None => {
                return Err(MultiplexError::Service(anyhow::anyhow!(
                    "get is a query-only operation"
                )))
            }
        });

        Ok(response.write_to_bytes()?)
    }

    async fn apply_query(&self, ctx: &Context, payload: &[u8]) -> Result<Vec<u8>, MultiplexError> {
        let request = proto::CounterRequest::parse_from_bytes(payload)?;
        match request.op {
            Some(Op::get(_)) => {
                let mut response = proto::CounterResponse::new();
                response.set_index(ctx.index);
                let mut result = proto::GetResult::new();
                result.set_value(self.value);
                response.result = Some(ResultKind::get(result));
                Ok(response.write_to_bytes()?)
            }
            _ => Err(MultiplexError::Service(anyhow::anyhow!(
                "only get may be issued as a query"
            ))),
        }
    }

    fn snapshot(&self, output: &mut dyn Write) -> Result<(), MultiplexError> {
        let mut snapshot = proto::CounterSnapshot::new();
        snapshot.set_value(self.value);
        snapshot.write_length_delimited_to_writer(output)?;
        Ok(())
    }

    fn restore(&mut self, input: &mut CodedInputStream<'_>) -> Result<(), MultiplexError> {
        let snapshot: proto::CounterSnapshot = input.read_message()?;
        self.value = snapshot.value;
        Ok(())
    }

    fn can_delete(&self, _index: u64) -> bool {
        true
    }
}

/// A thin client library for [`AtomicCounter`]: pure data flow that builds
/// request payloads and parses response payloads, with no dynamic proxy
/// generation. Pairs with [`crate::envelope`] to build a full
/// `ServiceRequest`/`ServiceResponse` envelope around these bytes.
pub mod client {
    use protobuf::Message;

    use super::{proto, Op, ResultKind};

    pub fn set(value: i64) -> Vec<u8> {
        let mut request = proto::CounterRequest::new();
        let mut op = proto::SetOp::new();
        op.set_value(value);
        request.op = Some(Op::set(op));
        request.write_to_bytes().expect("encoding never fails")
    }

    pub fn get() -> Vec<u8> {
        let mut request = proto::CounterRequest::new();
        request.op = Some(Op::get(proto::GetOp::new()));
        request.write_to_bytes().expect("encoding never fails")
    }

    pub fn check_and_set(expect: i64, update: i64) -> Vec<u8> {
        let mut request = proto::CounterRequest::new();
        let mut op = proto::CheckAndSetOp::new();
        op.set_expect(expect);
        op.set_update(update);
        request.op = Some(Op::check_and_set(op));
        request.write_to_bytes().expect("encoding never fails")
    }

    pub fn increment(delta: i64) -> Vec<u8> {
        let mut request = proto::CounterRequest::new();
        let mut op = proto::IncrementOp::new();
        op.set_delta(delta);
        request.op = Some(Op::increment(op));
        request.write_to_bytes().expect("encoding never fails")
    }

    pub fn decrement(delta: i64) -> Vec<u8> {
        let mut request = proto::CounterRequest::new();
        let mut op = proto::DecrementOp::new();
        op.set_delta(delta);
        request.op = Some(Op::decrement(op));
        request.write_to_bytes().expect("encoding never fails")
    }

    /// The decoded, human-shaped form of a `CounterResponse`.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Response {
        pub index: u64,
        pub result: CounterResult,
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum CounterResult {
        Set { previous: i64 },
        Get { value: i64 },
        CheckAndSet { succeeded: bool },
        Increment { previous: i64, next: i64 },
        Decrement { previous: i64, next: i64 },
    }

    pub fn parse_response(bytes: &[u8]) -> Result<Response, protobuf::ProtobufError> {
        let response = proto::CounterResponse::parse_from_bytes(bytes)?;
        let result = match response.result {
            Some(ResultKind::set(r)) => CounterResult::Set { previous: r.previous },
            Some(ResultKind::get(r)) => CounterResult::Get { value: r.value },
            Some(ResultKind::check_and_set(r)) => CounterResult::CheckAndSet {
                succeeded: r.succeeded,
            },
            Some(ResultKind::increment(r)) => CounterResult::Increment {
                previous: r.previous,
                next: r.next,
            },
            Some(ResultKind::decrement(r)) => CounterResult::Decrement {
                previous: r.previous,
                next: r.next,
            },
            None => {
                return Err(protobuf::ProtobufError::WireError(
                    protobuf::error::WireError::Other,
                ))
            }
        };
        Ok(Response {
            index: response.index,
            result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::OperationKind;

    fn ctx(index: u64) -> Context {
        Context::new(index, 0, OperationKind::Command)
    }

    fn query_ctx(index: u64) -> Context {
        Context::new(index, 0, OperationKind::Query)
    }

    fn increment(delta: i64) -> Vec<u8> {
        let mut request = proto::CounterRequest::new();
        let mut op = proto::IncrementOp::new();
        op.set_delta(delta);
        request.op = Some(Op::increment(op));
        request.write_to_bytes().unwrap()
    }

    fn get() -> Vec<u8> {
        let mut request = proto::CounterRequest::new();
        request.op = Some(Op::get(proto::GetOp::new()));
        request.write_to_bytes().unwrap()
    }

    #[tokio::test]
    async fn increment_with_zero_delta_adds_one() {
        let mut counter = AtomicCounter::new();
        let bytes = counter
            .apply_command(&ctx(1), &increment(0))
            .await
            .unwrap();
        let response = proto::CounterResponse::parse_from_bytes(&bytes).unwrap();
        match response.result {
            Some(ResultKind::increment(result)) => {
                assert_eq!(result.previous, 0);
                assert_eq!(result.next, 1);
            }
            _ => panic!("expected an increment result"),
        }
    }

    #[tokio::test]
    async fn increment_wraps_on_overflow() {
        let mut counter = AtomicCounter::new();
        counter.value = i64::MAX;
        let bytes = counter
            .apply_command(&ctx(1), &increment(1))
            .await
            .unwrap();
        let response = proto::CounterResponse::parse_from_bytes(&bytes).unwrap();
        match response.result {
            Some(ResultKind::increment(result)) => assert_eq!(result.next, i64::MIN),
            _ => panic!("expected an increment result"),
        }
    }

    #[tokio::test]
    async fn snapshot_restore_round_trip() {
        let mut counter = AtomicCounter::new();
        counter
            .apply_command(&ctx(1), &increment(41))
            .await
            .unwrap();

        let mut buf = Vec::new();
        counter.snapshot(&mut buf).unwrap();

        let mut restored = AtomicCounter::new();
        let mut input = CodedInputStream::from_bytes(&buf);
        restored.restore(&mut input).unwrap();

        let bytes = restored.apply_query(&query_ctx(2), &get()).await.unwrap();
        let response = proto::CounterResponse::parse_from_bytes(&bytes).unwrap();
        match response.result {
            Some(ResultKind::get(result)) => assert_eq!(result.value, 41),
            _ => panic!("expected a get result"),
        }
    }

    #[test]
    fn can_delete_is_always_true() {
        let counter = AtomicCounter::new();
        assert!(counter.can_delete(0));
        assert!(counter.can_delete(u64::MAX));
    }
}
