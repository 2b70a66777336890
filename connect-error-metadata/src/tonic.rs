//! Serving gRPC and Connect from one listener.
//!
//! [`ContentTypeSwitch`] sends `application/grpc*` requests to a tonic
//! service and everything else to an axum router, so a single port answers
//! both a tonic client and a Connect client.

use std::convert::Infallible;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header::CONTENT_TYPE};
use bytes::Bytes;
use futures::future::BoxFuture;
use http_body::Body as HttpBody;

/// Content types starting with this prefix are routed to the gRPC service.
pub const GRPC_CONTENT_TYPE_PREFIX: &str = "application/grpc";

fn is_grpc<B>(req: &Request<B>) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|s| s.starts_with(GRPC_CONTENT_TYPE_PREFIX))
}

fn internal_error<E: std::fmt::Display>(err: E) -> Response<Body> {
    let mut response = Response::new(Body::from(format!("internal error: {err}")));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}

/// Dispatches each request to `grpc` or `http` by its `Content-Type`.
///
/// Response bodies are wrapped with [`Body::new`], which keeps trailers;
/// gRPC needs them for `grpc-status` on non trailers-only responses.
#[derive(Clone, Debug)]
pub struct ContentTypeSwitch<G, H> {
    grpc: G,
    http: H,
}

impl<G, H> ContentTypeSwitch<G, H> {
    pub fn new(grpc: G, http: H) -> Self {
        Self { grpc, http }
    }
}

impl<G, GB, H, HB> tower::Service<Request<Body>> for ContentTypeSwitch<G, H>
where
    G: tower::Service<Request<Body>, Response = Response<GB>, Error = Infallible>
        + Clone
        + Send
        + 'static,
    G::Future: Send + 'static,
    GB: HttpBody<Data = Bytes> + Send + 'static,
    GB::Error: std::error::Error + Send + Sync + 'static,
    H: tower::Service<Request<Body>, Response = Response<HB>, Error = Infallible>
        + Clone
        + Send
        + 'static,
    H::Future: Send + 'static,
    HB: HttpBody<Data = Bytes> + Send + 'static,
    HB::Error: std::error::Error + Send + Sync + 'static,
{
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        // Each call clones its inner service and drives it with `oneshot`.
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        if is_grpc(&req) {
            let grpc = self.grpc.clone();
            Box::pin(async move {
                match tower::ServiceExt::oneshot(grpc, req).await {
                    Ok(res) => Ok(res.map(Body::new)),
                    Err(e) => Ok(internal_error(e)),
                }
            })
        } else {
            let http = self.http.clone();
            Box::pin(async move {
                match tower::ServiceExt::oneshot(http, req).await {
                    Ok(res) => Ok(res.map(Body::new)),
                    Err(e) => Ok(internal_error(e)),
                }
            })
        }
    }
}
