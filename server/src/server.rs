//! Socket setup and the receive/decode/engine/encode/send loop.

use std::net::{Ipv4Addr, SocketAddrV4};

use dhcp_protocol::DHCP_PORT_SERVER;
use netd_common::{BusyAddressSet, Config};
use socket2::{Domain, Socket, Type};
use thiserror::Error;
use tokio::net::UdpSocket;

use crate::engine::DhcpEngine;

const RECV_BUFFER_LEN: usize = 1500;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind the DHCP socket: {0}")]
    Bind(#[source] std::io::Error),
}

/// Binds `0.0.0.0:67` with `SO_REUSEADDR` and `SO_BROADCAST` set, since
/// replies to clients without an address yet must go out as broadcasts.
pub fn bind() -> Result<UdpSocket, ServerError> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, None).map_err(ServerError::Bind)?;
    socket.set_reuse_address(true).map_err(ServerError::Bind)?;
    socket.set_broadcast(true).map_err(ServerError::Bind)?;
    let addr = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, DHCP_PORT_SERVER);
    socket.bind(&addr.into()).map_err(ServerError::Bind)?;
    socket.set_nonblocking(true).map_err(ServerError::Bind)?;
    UdpSocket::from_std(socket.into()).map_err(ServerError::Bind)
}

/// Runs the server loop until `shutdown` resolves.
pub async fn run(
    socket: UdpSocket,
    config: Config,
    leased: BusyAddressSet,
    mut shutdown: tokio::sync::oneshot::Receiver<()>,
) -> std::io::Result<()> {
    let mut engine = DhcpEngine::new(config, leased);
    let mut buf = vec![0u8; RECV_BUFFER_LEN];

    loop {
        let (len, from) = tokio::select! {
            received = socket.recv_from(&mut buf) => match received {
                Ok(received) => received,
                Err(error) => {
                    log::warn!("DHCP socket receive error: {}", error);
                    continue;
                }
            },
            _ = &mut shutdown => {
                log::info!("DHCP server shutting down");
                return Ok(());
            }
        };
        log::debug!("received {} bytes from {}", len, from);

        if let Some((response, destination)) = engine.handle(&buf[..len]) {
            let bytes = response.to_bytes();
            if let Err(error) = socket.send_to(&bytes, destination).await {
                log::warn!("DHCP socket send error to {}: {}", destination, error);
            }
        }
    }
}
