use std::time::Duration;

use anyhow::{Context as _, Result, bail};
use tokio::net::TcpStream;
use url::Url;

/// How long to wait for the API server TCP handshake.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Check that the API server answers on its TCP port before anything is
/// mutated, so the operator can abort on a dead or mistyped endpoint.
pub async fn probe_server(server: &str) -> Result<()> {
    let url =
        Url::parse(server).with_context(|| format!("invalid API server URL {}", server))?;
    let host = url
        .host_str()
        .with_context(|| format!("API server URL {} has no host", server))?;
    let port = url.port_or_known_default().unwrap_or(6443);
    let addr = format!("{}:{}", host, port);

    match tokio::time::timeout(PROBE_TIMEOUT, TcpStream::connect(&addr)).await {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(e)) => bail!("failed to connect to {}: {}", addr, e),
        Err(_) => bail!(
            "connection to {} timed out after {}s",
            addr,
            PROBE_TIMEOUT.as_secs()
        ),
    }
}
