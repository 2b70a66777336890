//! Both bindings against real sockets, run the way `main` runs them.

use std::net::{IpAddr, Ipv4Addr};

use connect_error_metadata_core::Code;
use connect_error_metadata_demo::pb::HelloRequest;
use connect_error_metadata_demo::pb::greeter_client::GreeterClient;
use connect_error_metadata_demo::{
    Client, ConnectEncoding, DemoConfig, METADATA_KEY, METADATA_VALUE, Transport, connect, demo,
    grpc,
};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// A config pointing at a port that was free a moment ago.
async fn free_port_config(connect_encoding: ConnectEncoding) -> DemoConfig {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    DemoConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port,
        connect_encoding,
    }
}

#[tokio::test]
async fn connect_error_carries_metadata_in_header() {
    let config = free_port_config(ConnectEncoding::Json).await;
    let observations = demo::run(Transport::Connect, &config).await.unwrap();
    let observation = &observations[0];

    assert_eq!(observation.transport, Transport::Connect);
    assert_eq!(observation.client, Client::Connect);
    assert_eq!(observation.code, Code::Unimplemented);
    assert!(observation.error.as_deref().unwrap().contains("unimplemented"));
    assert_eq!(observation.header.get(METADATA_KEY), Some(METADATA_VALUE));
    assert!(observation.trailer.is_empty());
}

#[tokio::test]
async fn connect_server_error_reaches_grpc_client() {
    let config = free_port_config(ConnectEncoding::Json).await;
    let observations = demo::run(Transport::Connect, &config).await.unwrap();
    assert_eq!(observations.len(), 2);
    let observation = &observations[1];

    assert_eq!(observation.transport, Transport::Connect);
    assert_eq!(observation.client, Client::Grpc);
    assert_eq!(observation.code, Code::Unimplemented);
    assert_eq!(
        observation.error.as_deref(),
        Some("unimplemented: unimplemented")
    );
    assert!(observation.header.is_empty());
    assert_eq!(observation.trailer.get(METADATA_KEY), Some(METADATA_VALUE));
}

#[tokio::test]
async fn connect_proto_encoding_sees_the_same_metadata() {
    let config = free_port_config(ConnectEncoding::Proto).await;
    let observations = demo::run(Transport::Connect, &config).await.unwrap();

    assert_eq!(observations[0].code, Code::Unimplemented);
    assert_eq!(observations[0].metadata_value(METADATA_KEY), Some(METADATA_VALUE));
}

#[tokio::test]
async fn grpc_error_carries_metadata_in_trailer() {
    let config = free_port_config(ConnectEncoding::Json).await;
    let observations = demo::run(Transport::Grpc, &config).await.unwrap();
    assert_eq!(observations.len(), 1);
    let observation = &observations[0];

    assert_eq!(observation.transport, Transport::Grpc);
    assert_eq!(observation.client, Client::Grpc);
    assert_eq!(observation.code, Code::Unimplemented);
    assert_eq!(
        observation.error.as_deref(),
        Some("unimplemented: unimplemented")
    );
    assert!(observation.header.is_empty());
    assert_eq!(observation.trailer.get(METADATA_KEY), Some(METADATA_VALUE));
}

#[tokio::test]
async fn bindings_run_sequentially_on_one_port() {
    let config = free_port_config(ConnectEncoding::Json).await;
    let mut out = Vec::new();

    let observations = demo::run_all(&config, &mut out).await.unwrap();

    assert_eq!(observations.len(), 3);
    for observation in &observations {
        assert_eq!(observation.code, Code::Unimplemented);
        assert_eq!(observation.metadata_value(METADATA_KEY), Some(METADATA_VALUE));
    }

    let out = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "Connect (Connect client)");
    assert_eq!(lines[1], "unimplemented: unimplemented");
    assert!(lines[2].starts_with("header: {"));
    assert!(lines[2].contains("custom-key: [value]"));
    assert_eq!(lines[3], "trailer: {}");
    assert_eq!(lines[4], "Connect (gRPC client)");
    assert_eq!(lines[5], "unimplemented: unimplemented");
    assert_eq!(lines[6], "header: {}");
    assert!(lines[7].contains("custom-key: [value]"));
    assert_eq!(lines[8], demo::SEPARATOR);
    assert_eq!(lines[9], "gRPC (gRPC client)");
    assert_eq!(lines[10], "unimplemented: unimplemented");
    assert_eq!(lines[11], "header: {}");
    assert!(lines[12].contains("custom-key: [value]"));

    // Both servers are gone: the port can be bound again.
    let listener = TcpListener::bind(config.addr()).await.unwrap();
    drop(listener);
}

#[tokio::test]
async fn occupied_port_is_a_listen_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let config = DemoConfig {
        port: listener.local_addr().unwrap().port(),
        ..DemoConfig::default()
    };

    let err = demo::run(Transport::Connect, &config).await.unwrap_err();
    assert_eq!(err.to_string(), "listen");
}

#[tokio::test]
async fn grpc_named_request_and_streaming_methods() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown, rx) = oneshot::channel();
    let server = tokio::spawn(grpc::serve(listener, rx));

    let mut client = GreeterClient::connect(format!("http://{addr}")).await.unwrap();

    let status = client
        .say_hello(HelloRequest {
            name: "gopher".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), tonic::Code::Unimplemented);
    assert_eq!(
        status.metadata().get(METADATA_KEY).and_then(|v| v.to_str().ok()),
        Some(METADATA_VALUE)
    );

    let status = match client.say_hello_stream_reply(HelloRequest::default()).await {
        Ok(_) => panic!("expected unimplemented"),
        Err(status) => status,
    };
    assert_eq!(status.code(), tonic::Code::Unimplemented);
    assert!(status.metadata().get(METADATA_KEY).is_none());

    drop(client);
    let _ = shutdown.send(());
    server.await.unwrap().unwrap();
}

#[tokio::test]
async fn connect_server_answers_tonic_client_on_same_port() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown, rx) = oneshot::channel();
    let server = tokio::spawn(connect::serve(listener, rx));

    let mut client = GreeterClient::connect(format!("http://{addr}")).await.unwrap();
    let status = client
        .say_hello(HelloRequest {
            name: "gopher".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), tonic::Code::Unimplemented);
    assert_eq!(status.message(), "unimplemented");
    assert_eq!(
        status.metadata().get(METADATA_KEY).and_then(|v| v.to_str().ok()),
        Some(METADATA_VALUE)
    );

    drop(client);
    let _ = shutdown.send(());
    server.await.unwrap().unwrap();
}
