//! The gRPC binding: a tonic server and the generated tonic client.

use std::net::SocketAddr;

use anyhow::Context;
use connect_error_metadata_core::{Code, Metadata};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tonic::codegen::BoxStream;
use tonic::metadata::{MetadataMap, MetadataValue};
use tonic::transport::Server;
use tonic::transport::server::TcpIncoming;
use tonic::{Request, Response, Status, Streaming};

use crate::demo::{Client, Observation, Transport};
use crate::pb::greeter_client::GreeterClient;
use crate::pb::greeter_server::{Greeter, GreeterServer};
use crate::pb::{HelloReply, HelloRequest};
use crate::{METADATA_KEY, METADATA_VALUE, UNIMPLEMENTED_MESSAGE};

#[derive(Debug, Default, Clone, Copy)]
pub struct GreeterService;

#[tonic::async_trait]
impl Greeter for GreeterService {
    /// Always fails with `unimplemented`, carrying `custom-key: value` as metadata.
    async fn say_hello(
        &self,
        request: Request<HelloRequest>,
    ) -> Result<Response<HelloReply>, Status> {
        tracing::info!(name = %request.get_ref().name, "grpc SayHello");

        let mut metadata = MetadataMap::new();
        metadata.insert(METADATA_KEY, MetadataValue::from_static(METADATA_VALUE));
        Err(Status::with_metadata(
            tonic::Code::Unimplemented,
            UNIMPLEMENTED_MESSAGE,
            metadata,
        ))
    }

    type SayHelloStreamReplyStream = BoxStream<HelloReply>;

    async fn say_hello_stream_reply(
        &self,
        _request: Request<HelloRequest>,
    ) -> Result<Response<Self::SayHelloStreamReplyStream>, Status> {
        Err(Status::unimplemented(UNIMPLEMENTED_MESSAGE))
    }

    type SayHelloBidiStreamStream = BoxStream<HelloReply>;

    async fn say_hello_bidi_stream(
        &self,
        _request: Request<Streaming<HelloRequest>>,
    ) -> Result<Response<Self::SayHelloBidiStreamStream>, Status> {
        Err(Status::unimplemented(UNIMPLEMENTED_MESSAGE))
    }
}

/// Serve the Greeter on `listener` until `shutdown` fires or its sender is
/// dropped.
pub async fn serve(listener: TcpListener, shutdown: oneshot::Receiver<()>) -> anyhow::Result<()> {
    let addr = listener.local_addr().context("local addr")?;
    tracing::info!(%addr, "grpc server listening");

    Server::builder()
        .add_service(GreeterServer::new(GreeterService))
        .serve_with_incoming_shutdown(TcpIncoming::from(listener), async {
            let _ = shutdown.await;
        })
        .await
        .context("serve grpc")?;

    tracing::info!(%addr, "grpc server stopped");
    Ok(())
}

/// Call `SayHello` on `transport`'s server with an empty request and record
/// what came back. Both servers accept the gRPC client.
///
/// The error arrives as a trailers-only response, which tonic folds into
/// [`Status::metadata`]; it is reported as trailer metadata with an empty
/// header map.
pub async fn observe(transport: Transport, addr: SocketAddr) -> anyhow::Result<Observation> {
    let mut client = GreeterClient::connect(format!("http://{addr}"))
        .await
        .context("new client")?;

    match client.say_hello(HelloRequest::default()).await {
        Ok(response) => {
            let header = Metadata::new(response.metadata().clone().into_headers());
            Ok(Observation::success(
                transport,
                Client::Grpc,
                header,
                Metadata::empty(),
            ))
        }
        Err(status) => Ok(observation_from_status(transport, &status)),
    }
}

pub(crate) fn observation_from_status(transport: Transport, status: &Status) -> Observation {
    let code = Code::from(status.code());
    let text = if status.message().is_empty() {
        code.to_string()
    } else {
        format!("{code}: {}", status.message())
    };
    Observation::failure(
        transport,
        Client::Grpc,
        code,
        text,
        Metadata::empty(),
        Metadata::new(status.metadata().clone().into_headers()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_say_hello_attaches_metadata() {
        let status = GreeterService
            .say_hello(Request::new(HelloRequest {
                name: "gopher".to_string(),
            }))
            .await
            .unwrap_err();

        assert_eq!(status.code(), tonic::Code::Unimplemented);
        assert_eq!(status.message(), UNIMPLEMENTED_MESSAGE);
        assert_eq!(
            status.metadata().get(METADATA_KEY).and_then(|v| v.to_str().ok()),
            Some(METADATA_VALUE)
        );
    }

    #[tokio::test]
    async fn test_stream_reply_has_no_metadata() {
        let status = match GreeterService
            .say_hello_stream_reply(Request::new(HelloRequest::default()))
            .await
        {
            Ok(_) => panic!("expected unimplemented"),
            Err(status) => status,
        };

        assert_eq!(status.code(), tonic::Code::Unimplemented);
        assert!(status.metadata().get(METADATA_KEY).is_none());
    }

    #[test]
    fn test_observation_from_status() {
        let mut metadata = MetadataMap::new();
        metadata.insert(METADATA_KEY, MetadataValue::from_static(METADATA_VALUE));
        let status = Status::with_metadata(tonic::Code::Unimplemented, "unimplemented", metadata);

        let observation = observation_from_status(Transport::Connect, &status);
        assert_eq!(observation.transport, Transport::Connect);
        assert_eq!(observation.client, Client::Grpc);
        assert_eq!(observation.code, Code::Unimplemented);
        assert_eq!(observation.error.as_deref(), Some("unimplemented: unimplemented"));
        assert!(observation.header.is_empty());
        assert_eq!(observation.trailer.get(METADATA_KEY), Some(METADATA_VALUE));
    }
}
