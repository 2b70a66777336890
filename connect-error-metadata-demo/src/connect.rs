//! The Connect binding: an axum server and the hyper-based client.
//!
//! The server also speaks gRPC on the same listener. `application/grpc`
//! requests reach [`ConnectGreeter`], which runs the same [`say_hello`]
//! handler and hands its error to tonic with the metadata attached.

use std::net::SocketAddr;

use anyhow::Context;
use axum::Router;
use connect_error_metadata::ContentTypeSwitch;
use connect_error_metadata::prelude::*;
use connect_error_metadata_client::ConnectClient;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tonic::codegen::BoxStream;
use tonic::{Status, Streaming};

use crate::config::ConnectEncoding;
use crate::demo::{Client, Observation, Transport};
use crate::pb::greeter_server::{Greeter, GreeterServer};
use crate::pb::{HelloReply, HelloRequest};
use crate::{METADATA_KEY, METADATA_VALUE, UNIMPLEMENTED_MESSAGE};

/// Route of the unary `SayHello` procedure.
pub const SAY_HELLO_PATH: &str = "/helloworld.Greeter/SayHello";

/// Always fails with `unimplemented`, carrying `custom-key: value` as metadata.
pub async fn say_hello(
    ConnectRequest(req): ConnectRequest<HelloRequest>,
) -> Result<ConnectResponse<HelloReply>, ConnectError> {
    tracing::info!(name = %req.name, "connect SayHello");
    Err(ConnectError::new(Code::Unimplemented, UNIMPLEMENTED_MESSAGE)
        .with_meta(METADATA_KEY, METADATA_VALUE))
}

pub fn router() -> Router {
    Router::new().route(SAY_HELLO_PATH, post_connect(say_hello))
}

/// gRPC entry point of the Connect server.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConnectGreeter;

#[tonic::async_trait]
impl Greeter for ConnectGreeter {
    async fn say_hello(
        &self,
        request: tonic::Request<HelloRequest>,
    ) -> Result<tonic::Response<HelloReply>, Status> {
        let response = say_hello(ConnectRequest(request.into_inner())).await?;
        Ok(tonic::Response::new(response.into_inner()))
    }

    type SayHelloStreamReplyStream = BoxStream<HelloReply>;

    async fn say_hello_stream_reply(
        &self,
        _request: tonic::Request<HelloRequest>,
    ) -> Result<tonic::Response<Self::SayHelloStreamReplyStream>, Status> {
        Err(Status::unimplemented(UNIMPLEMENTED_MESSAGE))
    }

    type SayHelloBidiStreamStream = BoxStream<HelloReply>;

    async fn say_hello_bidi_stream(
        &self,
        _request: tonic::Request<Streaming<HelloRequest>>,
    ) -> Result<tonic::Response<Self::SayHelloBidiStreamStream>, Status> {
        Err(Status::unimplemented(UNIMPLEMENTED_MESSAGE))
    }
}

/// The Connect router plus [`ConnectGreeter`], dispatched by content type.
pub fn service() -> ContentTypeSwitch<GreeterServer<ConnectGreeter>, Router> {
    ContentTypeSwitch::new(GreeterServer::new(ConnectGreeter), router())
}

/// Serve the Connect router on `listener` until `shutdown` fires or its sender
/// is dropped.
pub async fn serve(listener: TcpListener, shutdown: oneshot::Receiver<()>) -> anyhow::Result<()> {
    let addr = listener.local_addr().context("local addr")?;
    tracing::info!(%addr, "connect server listening");

    axum::serve(listener, tower::make::Shared::new(service()))
        .with_graceful_shutdown(async {
            let _ = shutdown.await;
        })
        .await
        .context("serve connect")?;

    tracing::info!(%addr, "connect server stopped");
    Ok(())
}

/// Call `SayHello` through the Connect client and record what came back.
///
/// A status error from the server is an observation, not a failure; local
/// errors (connection refused, undecodable body) are returned as `Err`.
pub async fn observe(addr: SocketAddr, encoding: ConnectEncoding) -> anyhow::Result<Observation> {
    let mut builder = ConnectClient::builder(format!("http://{addr}"));
    if encoding == ConnectEncoding::Proto {
        builder = builder.use_proto();
    }
    let client = builder.build().context("new client")?;

    let result = client
        .call_unary::<HelloRequest, HelloReply>(SAY_HELLO_PATH, &HelloRequest::default())
        .await;

    match result {
        Ok(response) => {
            let (_, header, trailer) = response.into_parts();
            Ok(Observation::success(
                Transport::Connect,
                Client::Connect,
                header,
                trailer,
            ))
        }
        Err(err) if err.is_status() => Ok(Observation::failure(
            Transport::Connect,
            Client::Connect,
            err.code(),
            err.to_string(),
            err.header().cloned().unwrap_or_default(),
            err.trailer().cloned().unwrap_or_default(),
        )),
        Err(err) => Err(err).context("say hello"),
    }
}
