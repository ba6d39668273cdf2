//! Decodes a request, dispatches it, and builds the reply plus its
//! destination. Stateless beyond the lease pool: everything else about a
//! transaction lives in the request and the config it's checked against.

use std::net::{SocketAddr, SocketAddrV4};
use std::time::Instant;

use dhcp_protocol::{Message, MessageType};
use netd_common::{BusyAddressSet, Config};

use crate::builder::MessageBuilder;
use crate::destination::{nak_destination, unicast_or_broadcast};
use crate::lease::{LeasePool, RequestOutcome};

pub struct DhcpEngine {
    config: Config,
    builder: MessageBuilder,
    pool: LeasePool,
}

impl DhcpEngine {
    pub fn new(config: Config, leased: BusyAddressSet) -> DhcpEngine {
        let builder = MessageBuilder::new(
            config.dhcp_server_ip,
            config.subnet_mask,
            config.router_ip,
            config.dns_ip,
            config.lease_seconds,
        );
        let pool = LeasePool::new(config.pool_start, config.pool_end, leased);
        DhcpEngine { config, builder, pool }
    }

    /// Returns `None` for anything this server drops silently: a malformed
    /// frame, a message type it doesn't originate replies for, or pool
    /// exhaustion on a DISCOVER.
    pub fn handle(&mut self, datagram: &[u8]) -> Option<(Message, SocketAddr)> {
        let request = match Message::from_bytes(datagram) {
            Ok(message) => message,
            Err(error) => {
                log::debug!("dropping malformed DHCP packet: {}", error);
                return None;
            }
        };

        let message_type = request.options.message_type?;
        log::info!("received {} (xid {:#010x})", message_type, request.transaction_id);

        match message_type {
            MessageType::Discover => self.handle_discover(&request),
            MessageType::Request => self.handle_request(&request),
            MessageType::Decline | MessageType::Release | MessageType::Inform => {
                log::debug!("{} is out of scope, dropping", message_type);
                None
            }
            MessageType::Offer | MessageType::Ack | MessageType::Nak => {
                log::debug!("dropping reply-only message type {} received from a client", message_type);
                None
            }
        }
    }

    fn handle_discover(&mut self, request: &Message) -> Option<(Message, SocketAddr)> {
        let offered = self.pool.offer(Instant::now()).or_else(|| {
            log::warn!("address pool exhausted, dropping DISCOVER (xid {:#010x})", request.transaction_id);
            None
        })?;

        let response = self.builder.offer(request, offered);
        let (ip, port) = unicast_or_broadcast(request, &response, self.config.subnet_mask, self.config.dhcp_server_ip);
        log::info!("offering {} (xid {:#010x})", offered, request.transaction_id);
        Some((response, SocketAddr::V4(SocketAddrV4::new(ip, port))))
    }

    fn handle_request(&mut self, request: &Message) -> Option<(Message, SocketAddr)> {
        let requested = match request.options.requested_address {
            Some(addr) => addr,
            None => {
                log::debug!("REQUEST with no option 50 (xid {:#010x}), dropping", request.transaction_id);
                return None;
            }
        };

        let (outcome, persist_error) = self.pool.request(requested);
        if let Some(error) = persist_error {
            log::error!("failed to persist busy-address set: {}", error);
        }

        match outcome {
            RequestOutcome::Ack => {
                let response = self.builder.ack(request, requested);
                let (ip, port) = unicast_or_broadcast(request, &response, self.config.subnet_mask, self.config.dhcp_server_ip);
                log::info!("acking {} (xid {:#010x})", requested, request.transaction_id);
                Some((response, SocketAddr::V4(SocketAddrV4::new(ip, port))))
            }
            RequestOutcome::NakOutOfRange | RequestOutcome::NakAlreadyBusy => {
                let response = self.builder.nak(request);
                let (ip, port) = nak_destination(self.config.dhcp_server_ip, self.config.subnet_mask);
                log::info!("nacking request for {} (xid {:#010x})", requested, request.transaction_id);
                Some((response, SocketAddr::V4(SocketAddrV4::new(ip, port))))
            }
        }
    }
}
