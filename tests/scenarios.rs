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

use pretty_assertions::assert_eq;
use primitive_mux::{
    envelope::{decode_response, encode_request, RequestKind, ResponseKind},
    primitives::counter::{self, client, AtomicCounter},
    sink::{RecordingSink, StreamingResponse},
    MultiplexError, ServiceId, ServiceManager, ServiceTypeRegistry,
};

fn registry() -> ServiceTypeRegistry {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut registry = ServiceTypeRegistry::new();
    registry.register(counter::SERVICE_TYPE, || Box::new(AtomicCounter::new()));
    registry
}

fn counter_id(name: &str) -> ServiceId {
    ServiceId::new(name, counter::SERVICE_TYPE)
}

async fn command(manager: &mut ServiceManager, index: u64, id: &ServiceId, kind: RequestKind) -> ResponseKind {
    let bytes = encode_request(id, kind);
    let response = manager.apply_command(index, index, &bytes).await.unwrap();
    decode_response(&response).unwrap()
}

async fn query(manager: &mut ServiceManager, index: u64, id: &ServiceId, kind: RequestKind) -> ResponseKind {
    let bytes = encode_request(id, kind);
    let response = manager.apply_query(index, index, &bytes).await.unwrap();
    decode_response(&response).unwrap()
}

fn counter_view(kind: ResponseKind) -> client::Response {
    match kind {
        ResponseKind::Command { payload } | ResponseKind::Query { payload } => {
            client::parse_response(&payload).unwrap()
        }
        _ => panic!("expected a command/query response carrying a counter payload"),
    }
}

/// S1: create implicitly via the first command, increment with delta=0
/// (adds one), increment with an explicit delta, then read back via query.
#[tokio::test]
async fn s1_counter_basic_lifecycle() {
    let mut manager = ServiceManager::new(registry());
    let id = counter_id("c1");

    let response = counter_view(
        command(&mut manager, 1, &id, RequestKind::Command { payload: client::increment(0) }).await,
    );
    assert_eq!(response.result, client::CounterResult::Increment { previous: 0, next: 1 });

    let response = counter_view(
        command(&mut manager, 2, &id, RequestKind::Command { payload: client::increment(5) }).await,
    );
    assert_eq!(response.result, client::CounterResult::Increment { previous: 1, next: 6 });

    let response = counter_view(
        query(&mut manager, 3, &id, RequestKind::Query { payload: client::get() }).await,
    );
    assert_eq!(response.result, client::CounterResult::Get { value: 6 });
}

/// S2: compare-and-set, both the successful and the failing case.
#[tokio::test]
async fn s2_check_and_set() {
    let mut manager = ServiceManager::new(registry());
    let id = counter_id("c1");

    command(&mut manager, 1, &id, RequestKind::Command { payload: client::set(10) }).await;

    let response = counter_view(
        command(&mut manager, 2, &id, RequestKind::Command {
            payload: client::check_and_set(10, 20),
        })
        .await,
    );
    assert_eq!(response.result, client::CounterResult::CheckAndSet { succeeded: true });

    let response = counter_view(
        command(&mut manager, 3, &id, RequestKind::Command {
            payload: client::check_and_set(10, 99),
        })
        .await,
    );
    assert_eq!(response.result, client::CounterResult::CheckAndSet { succeeded: false });

    let response = counter_view(
        query(&mut manager, 4, &id, RequestKind::Query { payload: client::get() }).await,
    );
    assert_eq!(response.result, client::CounterResult::Get { value: 20 });
}

/// S3: a streaming query against a deleted id fails with `UnknownService`,
/// while a non-streaming query against an id that was never created at all
/// succeeds via the transient-instance path and reads the type's zero value.
#[tokio::test]
async fn s3_delete_and_transient_query() {
    let mut manager = ServiceManager::new(registry());
    let id = counter_id("c1");

    command(&mut manager, 1, &id, RequestKind::Command { payload: client::set(7) }).await;
    command(&mut manager, 2, &id, RequestKind::Delete).await;

    let mut sink = RecordingSink::default();
    manager
        .apply_query_stream(3, 3, &encode_request(&id, RequestKind::Query { payload: client::get() }), &mut sink)
        .await;
    assert!(sink.chunks.is_empty());
    assert!(matches!(sink.error, Some(MultiplexError::UnknownService(unknown)) if unknown == id));

    let never_created = counter_id("c2");
    let response = counter_view(
        query(&mut manager, 4, &never_created, RequestKind::Query { payload: client::get() }).await,
    );
    assert_eq!(response.result, client::CounterResult::Get { value: 0 });
    // The transient read must not have left behind a live instance.
    assert_eq!(manager.len(), 0);
}

/// S4: snapshot a manager with two live counters, restore into a fresh one,
/// and check both the observable values and byte-for-byte snapshot equality.
#[tokio::test]
async fn s4_snapshot_restore_round_trip() {
    let mut manager = ServiceManager::new(registry());
    let c1 = counter_id("c1");
    let c2 = counter_id("c2");

    command(&mut manager, 1, &c1, RequestKind::Command { payload: client::set(5) }).await;
    command(&mut manager, 2, &c2, RequestKind::Command { payload: client::set(9) }).await;

    let mut snapshot = Vec::new();
    manager.snapshot(&mut snapshot).unwrap();

    let mut restored = ServiceManager::new(registry());
    restored.restore(&mut snapshot.as_slice()).unwrap();

    let response = counter_view(
        query(&mut restored, 3, &c1, RequestKind::Query { payload: client::get() }).await,
    );
    assert_eq!(response.result, client::CounterResult::Get { value: 5 });
    let response = counter_view(
        query(&mut restored, 4, &c2, RequestKind::Query { payload: client::get() }).await,
    );
    assert_eq!(response.result, client::CounterResult::Get { value: 9 });

    let mut re_snapshot = Vec::new();
    restored.snapshot(&mut re_snapshot).unwrap();
    assert_eq!(snapshot, re_snapshot);
}

/// S5: metadata listing is filtered by type and always ordered by
/// `(service_type, name)`, regardless of creation order.
#[tokio::test]
async fn s5_metadata_filter_and_ordering() {
    let mut registry = ServiceTypeRegistry::new();
    registry.register(counter::SERVICE_TYPE, || Box::new(AtomicCounter::new()));
    // No dedicated map primitive ships yet; reuse the counter factory under
    // a second type tag purely to exercise cross-type filtering.
    registry.register("map", || Box::new(AtomicCounter::new()));
    let mut manager = ServiceManager::new(registry);

    let b = ServiceId::new("b", counter::SERVICE_TYPE);
    let a = ServiceId::new("a", counter::SERVICE_TYPE);
    let m1 = ServiceId::new("m1", "map");

    command(&mut manager, 1, &b, RequestKind::Create).await;
    command(&mut manager, 2, &m1, RequestKind::Create).await;
    command(&mut manager, 3, &a, RequestKind::Create).await;

    let unfiltered = query(&mut manager, 4, &a, RequestKind::Metadata { type_filter: None }).await;
    match unfiltered {
        ResponseKind::Metadata { services } => {
            assert_eq!(services, vec![a.clone(), b.clone(), m1.clone()]);
        }
        _ => panic!("expected a Metadata response"),
    }

    let filtered = query(
        &mut manager,
        5,
        &a,
        RequestKind::Metadata { type_filter: Some(counter::SERVICE_TYPE.to_owned()) },
    )
    .await;
    match filtered {
        ResponseKind::Metadata { services } => assert_eq!(services, vec![a, b]),
        _ => panic!("expected a Metadata response"),
    }
}

/// S6: a streaming command reports chunks in order followed by exactly one
/// terminal call, matching the default `apply_command_stream` behavior for
/// a service that never overrides it.
#[tokio::test]
async fn s6_streaming_terminates_once() {
    let mut manager = ServiceManager::new(registry());
    let id = counter_id("c1");

    let mut sink = RecordingSink::default();
    manager
        .apply_command_stream(1, 1, &encode_request(&id, RequestKind::Command { payload: client::increment(1) }), &mut sink)
        .await;

    assert_eq!(sink.chunks.len(), 1);
    assert!(sink.completed);
    assert!(sink.error.is_none());

    let view = client::parse_response(&sink.chunks[0]).unwrap();
    assert_eq!(view.result, client::CounterResult::Increment { previous: 0, next: 1 });

    // A request for an unregistered service type fails before any chunk is
    // sent, and reports exactly one error, no `complete`.
    let mut sink = RecordingSink::default();
    let bad_id = ServiceId::new("x", "lock");
    manager
        .apply_command_stream(2, 2, &encode_request(&bad_id, RequestKind::Command { payload: vec![] }), &mut sink)
        .await;
    assert!(sink.chunks.is_empty());
    assert!(!sink.completed);
    assert!(matches!(sink.error, Some(MultiplexError::UnknownType(t)) if t == "lock"));
}
