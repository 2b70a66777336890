//! Generates the `helloworld.Greeter` gRPC client and server.
//!
//! The service is described with `tonic_build::manual`, so no `protoc` is
//! needed; the message types live in `src/pb.rs`.

fn main() {
    let method = |name: &str, route: &str| {
        tonic_build::manual::Method::builder()
            .name(name)
            .route_name(route)
            .input_type("crate::pb::HelloRequest")
            .output_type("crate::pb::HelloReply")
            .codec_path("tonic_prost::ProstCodec")
    };

    let greeter = tonic_build::manual::Service::builder()
        .name("Greeter")
        .package("helloworld")
        .method(method("say_hello", "SayHello").build())
        .method(
            method("say_hello_stream_reply", "SayHelloStreamReply")
                .server_streaming()
                .build(),
        )
        .method(
            method("say_hello_bidi_stream", "SayHelloBidiStream")
                .client_streaming()
                .server_streaming()
                .build(),
        )
        .build();

    tonic_build::manual::Builder::new().compile(&[greeter]);
}
