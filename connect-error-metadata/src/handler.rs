//! Glue between Connect handler functions and axum routing.

use axum::{
    extract::{FromRequest, Request},
    handler::Handler,
    response::Response,
    routing::MethodRouter,
};
use connect_error_metadata_core::RequestProtocol;
use prost::Message;
use serde::Serialize;
use std::{future::Future, pin::Pin};

use crate::{error::ConnectError, request::ConnectRequest, response::ConnectResponse};

/// A wrapper that adapts Connect handler functions to axum's Handler trait.
///
/// The request protocol is detected before extraction so that both the
/// message and any error are encoded the way the caller asked.
#[derive(Clone)]
pub struct ConnectHandlerWrapper<F>(pub F);

impl<F, Fut, S, Req, Resp> Handler<(ConnectRequest<Req>,), S> for ConnectHandlerWrapper<F>
where
    F: Fn(ConnectRequest<Req>) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<ConnectResponse<Resp>, ConnectError>> + Send + 'static,
    S: Clone + Send + Sync + 'static,
    ConnectRequest<Req>: FromRequest<S, Rejection = ConnectError>,
    Req: Send + Sync + 'static,
    Resp: Message + Serialize + Send + Sync + 'static,
{
    type Future = Pin<Box<dyn Future<Output = Response> + Send>>;

    fn call(self, req: Request, state: S) -> Self::Future {
        Box::pin(async move {
            let protocol = RequestProtocol::from_headers(req.headers());

            let connect_req = match ConnectRequest::<Req>::from_request(req, &state).await {
                Ok(value) => value,
                Err(err) => {
                    tracing::debug!(code = %err.code(), "request rejected");
                    return err.into_response_with_protocol(protocol);
                }
            };

            match (self.0)(connect_req).await {
                Ok(response) => response.into_response_with_protocol(protocol),
                Err(err) => err.into_response_with_protocol(protocol),
            }
        })
    }
}

/// Creates a method router from a Connect handler function.
///
/// The handler is registered for every method so that anything but POST gets
/// a Connect `unimplemented` error from [`ConnectRequest`] rather than a bare
/// 405.
pub fn post_connect<F, T, S>(f: F) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
    ConnectHandlerWrapper<F>: Handler<T, S>,
    T: 'static,
{
    axum::routing::any(ConnectHandlerWrapper(f))
}
