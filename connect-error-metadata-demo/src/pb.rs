//! `helloworld` messages and the generated `Greeter` client and server.
//!
//! Messages encode as protobuf for gRPC and `application/proto`, and as
//! proto3 JSON for `application/json`: default-valued fields are omitted and
//! unknown fields are ignored.

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HelloRequest {
    #[prost(string, tag = "1")]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
}

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HelloReply {
    #[prost(string, tag = "1")]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
}

include!(concat!(env!("OUT_DIR"), "/helloworld.Greeter.rs"));
