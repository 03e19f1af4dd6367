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

//! The envelope codec: a pair of pure functions translating between wire
//! bytes (protobuf, length-delimited at the transport layer) and the small
//! native enums the rest of the crate matches on. The codec itself carries
//! no state.

use protobuf::Message;

use crate::{
    error::MultiplexError,
    id::ServiceId,
    proto::{self, ServiceRequest_oneof_kind as ReqKind, ServiceResponse_oneof_kind as RespKind},
};

/// The decoded request sub-kind, with its routing `ServiceId` already split out.
#[derive(Debug, Clone)]
pub enum RequestKind {
    Create,
    Delete,
    Metadata { type_filter: Option<String> },
    Command { payload: Vec<u8> },
    Query { payload: Vec<u8> },
}

#[derive(Debug, Clone)]
pub enum ResponseKind {
    Create,
    Delete,
    Metadata { services: Vec<ServiceId> },
    Command { payload: Vec<u8> },
    Query { payload: Vec<u8> },
}

/// Decodes a `ServiceRequest` envelope, returning the target `ServiceId`
/// alongside its sub-kind.
pub fn decode_request(bytes: &[u8]) -> Result<(ServiceId, RequestKind), MultiplexError> {
    let mut request = proto::ServiceRequest::parse_from_bytes(bytes)?;
    let id = ServiceId::from(request.get_id());

    let kind = match request.kind.take() {
        Some(ReqKind::create(_)) => RequestKind::Create,
        Some(ReqKind::delete(_)) => RequestKind::Delete,
        Some(ReqKind::metadata(meta)) => {
            let filter = meta.type_filter;
            RequestKind::Metadata {
                type_filter: if filter.is_empty() { None } else { Some(filter) },
            }
        }
        Some(ReqKind::command(cmd)) => RequestKind::Command {
            payload: cmd.payload,
        },
        Some(ReqKind::query(query)) => RequestKind::Query {
            payload: query.payload,
        },
        None => {
            return Err(MultiplexError::Decode(
                "ServiceRequest is missing its `kind` field".to_owned(),
            ))
        }
    };

    Ok((id, kind))
}

/// Encodes a `ServiceRequest` envelope. Exposed for clients and tests that
/// need to build requests without hand-rolling protobuf.
pub fn encode_request(id: &ServiceId, kind: RequestKind) -> Vec<u8> {
    let mut request = proto::ServiceRequest::new();
    request.set_id(proto::ServiceId::from(id));

    request.kind = Some(match kind {
        RequestKind::Create => ReqKind::create(proto::CreateRequest::new()),
        RequestKind::Delete => ReqKind::delete(proto::DeleteRequest::new()),
        RequestKind::Metadata { type_filter } => {
            let mut metadata = proto::MetadataRequest::new();
            metadata.set_type_filter(type_filter.unwrap_or_default());
            ReqKind::metadata(metadata)
        }
        RequestKind::Command { payload } => {
            let mut command = proto::CommandRequest::new();
            command.set_payload(payload);
            ReqKind::command(command)
        }
        RequestKind::Query { payload } => {
            let mut query = proto::QueryRequest::new();
            query.set_payload(payload);
            ReqKind::query(query)
        }
    });

    request
        .write_to_bytes()
        .expect("writing a fully-populated ServiceRequest cannot fail")
}

pub fn decode_response(bytes: &[u8]) -> Result<ResponseKind, MultiplexError> {
    let mut response = proto::ServiceResponse::parse_from_bytes(bytes)?;
    let kind = match response.kind.take() {
        Some(RespKind::create(_)) => ResponseKind::Create,
        Some(RespKind::delete(_)) => ResponseKind::Delete,
        Some(RespKind::metadata(mut meta)) => ResponseKind::Metadata {
            services: meta.take_services().iter().map(ServiceId::from).collect(),
        },
        Some(RespKind::command(cmd)) => ResponseKind::Command {
            payload: cmd.payload,
        },
        Some(RespKind::query(query)) => ResponseKind::Query {
            payload: query.payload,
        },
        None => {
            return Err(MultiplexError::Decode(
                "ServiceResponse is missing its `kind` field".to_owned(),
            ))
        }
    };
    Ok(kind)
}

pub fn encode_response(kind: ResponseKind) -> Vec<u8> {
    let mut response = proto::ServiceResponse::new();

    response.kind = Some(match kind {
        ResponseKind::Create => RespKind::create(proto::CreateResponse::new()),
        ResponseKind::Delete => RespKind::delete(proto::DeleteResponse::new()),
        ResponseKind::Metadata { services } => {
            let mut metadata = proto::MetadataResponse::new();
            metadata.set_services(services.iter().map(proto::ServiceId::from).collect());
            RespKind::metadata(metadata)
        }
        ResponseKind::Command { payload } => {
            let mut command = proto::CommandResponse::new();
            command.set_payload(payload);
            RespKind::command(command)
        }
        ResponseKind::Query { payload } => {
            let mut query = proto::QueryResponse::new();
            query.set_payload(payload);
            RespKind::query(query)
        }
    });

    response
        .write_to_bytes()
        .expect("writing a fully-populated ServiceResponse cannot fail")
}
