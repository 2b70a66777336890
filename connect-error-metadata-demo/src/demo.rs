//! Runs one binding end to end: listen, call, tear down.

use std::fmt;
use std::io::Write;

use anyhow::Context;
use connect_error_metadata_core::{Code, Metadata};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use crate::config::DemoConfig;
use crate::{connect, grpc};

pub const SEPARATOR: &str = "-----------------";

/// The RPC protocol carrying `helloworld.Greeter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Connect,
    Grpc,
}

impl Transport {
    /// Demonstration order.
    pub const ALL: [Transport; 2] = [Transport::Connect, Transport::Grpc];

    pub fn label(&self) -> &'static str {
        match self {
            Transport::Connect => "Connect",
            Transport::Grpc => "gRPC",
        }
    }

    /// Clients called against this transport's server, in order.
    pub fn clients(&self) -> &'static [Client] {
        match self {
            Transport::Connect => &[Client::Connect, Client::Grpc],
            Transport::Grpc => &[Client::Grpc],
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The client that made a call. The Connect server answers both; the gRPC
/// server only the gRPC client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Client {
    Connect,
    Grpc,
}

impl fmt::Display for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Client::Connect => f.write_str("Connect client"),
            Client::Grpc => f.write_str("gRPC client"),
        }
    }
}

/// What the client saw for one `SayHello` call.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub transport: Transport,
    pub client: Client,
    pub code: Code,
    /// Error text, `None` when the call succeeded.
    pub error: Option<String>,
    pub header: Metadata,
    pub trailer: Metadata,
}

impl Observation {
    pub fn failure(
        transport: Transport,
        client: Client,
        code: Code,
        error: String,
        header: Metadata,
        trailer: Metadata,
    ) -> Self {
        Self {
            transport,
            client,
            code,
            error: Some(error),
            header,
            trailer,
        }
    }

    pub fn success(
        transport: Transport,
        client: Client,
        header: Metadata,
        trailer: Metadata,
    ) -> Self {
        Self {
            transport,
            client,
            code: Code::Ok,
            error: None,
            header,
            trailer,
        }
    }

    /// First value of `key` in the header metadata, else in the trailer metadata.
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.header.get(key).or_else(|| self.trailer.get(key))
    }
}

/// Renders the label, the error, then `header: {...}` and `trailer: {...}`.
impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({})", self.transport, self.client)?;
        writeln!(f, "{}", self.error.as_deref().unwrap_or("<nil>"))?;
        writeln!(f, "header: {}", self.header)?;
        write!(f, "trailer: {}", self.trailer)
    }
}

/// Start `transport`'s server on the configured address, call `SayHello`
/// once per client in [`Transport::clients`], then stop the server and wait
/// for it to exit.
///
/// On return the listening socket is closed, so the next binding can bind
/// the same port.
#[tracing::instrument(skip(config), fields(addr = %config.addr()))]
pub async fn run(transport: Transport, config: &DemoConfig) -> anyhow::Result<Vec<Observation>> {
    let addr = config.addr();
    let listener = TcpListener::bind(addr).await.context("listen")?;
    let (shutdown, rx) = oneshot::channel();

    let server = match transport {
        Transport::Connect => tokio::spawn(connect::serve(listener, rx)),
        Transport::Grpc => tokio::spawn(grpc::serve(listener, rx)),
    };

    let observations = observe_all(transport, config).await.context("request");

    // The clients are gone by now, so graceful shutdown has no open connection to wait on.
    let _ = shutdown.send(());
    server.await.context("join server")??;

    observations
}

async fn observe_all(
    transport: Transport,
    config: &DemoConfig,
) -> anyhow::Result<Vec<Observation>> {
    let addr = config.addr();
    let mut observations = Vec::with_capacity(transport.clients().len());
    for client in transport.clients() {
        let observation = match client {
            Client::Connect => connect::observe(addr, config.connect_encoding).await?,
            Client::Grpc => grpc::observe(transport, addr).await?,
        };
        observations.push(observation);
    }
    Ok(observations)
}

/// Run every binding in order, writing each observation to `out` with a
/// separator line between bindings.
pub async fn run_all<W: Write>(
    config: &DemoConfig,
    out: &mut W,
) -> anyhow::Result<Vec<Observation>> {
    let mut observations = Vec::new();

    for (i, transport) in Transport::ALL.into_iter().enumerate() {
        if i > 0 {
            writeln!(out, "{SEPARATOR}")?;
        }
        let run_observations = run(transport, config)
            .await
            .with_context(|| format!("run {}", transport.label().to_lowercase()))?;
        for observation in run_observations {
            writeln!(out, "{observation}")?;
            observations.push(observation);
        }
    }

    Ok(observations)
}
