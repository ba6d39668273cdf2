//! Socket setup and the client/upstream/sweep event loop.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::{Duration, Instant};

use netd_common::{Config, ZoneTable};
use thiserror::Error;
use tokio::net::UdpSocket;
use tokio::time::interval;

use crate::engine::{ClientAction, ForwarderEngine};

const RECV_BUFFER_LEN: usize = 1500;
const SWEEP_INTERVAL: Duration = Duration::from_secs(1);
const DNS_PORT: u16 = 53;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind DNS socket: {0}")]
    Bind(#[source] std::io::Error),
}

/// The client-facing socket: `0.0.0.0:53`.
pub async fn bind_client_socket() -> Result<UdpSocket, ServerError> {
    UdpSocket::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, DNS_PORT))
        .await
        .map_err(ServerError::Bind)
}

/// The upstream-facing socket, on an OS-assigned ephemeral port, kept
/// separate from the client socket so a reply from the upstream resolver
/// can never be confused with a query from a LAN client.
pub async fn bind_upstream_socket() -> Result<UdpSocket, ServerError> {
    UdpSocket::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0))
        .await
        .map_err(ServerError::Bind)
}

pub async fn run(
    client_socket: UdpSocket,
    upstream_socket: UdpSocket,
    config: Config,
    zone: ZoneTable,
    mut shutdown: tokio::sync::oneshot::Receiver<()>,
) -> std::io::Result<()> {
    let upstream_addr = SocketAddr::new(config.upstream_dns.into(), DNS_PORT);
    let mut engine = ForwarderEngine::new(zone);
    let mut client_buf = vec![0u8; RECV_BUFFER_LEN];
    let mut upstream_buf = vec![0u8; RECV_BUFFER_LEN];
    let mut sweep = interval(SWEEP_INTERVAL);

    loop {
        tokio::select! {
            received = client_socket.recv_from(&mut client_buf) => {
                let (len, from) = match received {
                    Ok(received) => received,
                    Err(error) => {
                        log::warn!("client socket receive error: {}", error);
                        continue;
                    }
                };
                match engine.handle_client(&client_buf[..len], from, Instant::now()) {
                    Some(ClientAction::ReplyToClient(reply)) => {
                        if let Err(error) = client_socket.send_to(&reply, from).await {
                            log::warn!("client socket send error to {}: {}", from, error);
                        }
                    }
                    Some(ClientAction::ForwardUpstream(forwarded)) => {
                        if let Err(error) = upstream_socket.send_to(&forwarded, upstream_addr).await {
                            log::warn!("upstream socket send error: {}", error);
                        }
                    }
                    None => {}
                }
            }
            received = upstream_socket.recv_from(&mut upstream_buf) => {
                let (len, _) = match received {
                    Ok(received) => received,
                    Err(error) => {
                        log::warn!("upstream socket receive error: {}", error);
                        continue;
                    }
                };
                if let Some((reply, client_addr)) = engine.handle_upstream(&upstream_buf[..len]) {
                    if let Err(error) = client_socket.send_to(&reply, client_addr).await {
                        log::warn!("client socket send error to {}: {}", client_addr, error);
                    }
                }
            }
            _ = sweep.tick() => {
                engine.sweep_expired(Instant::now());
            }
            _ = &mut shutdown => {
                log::info!("dns server shutting down");
                return Ok(());
            }
        }
    }
}
