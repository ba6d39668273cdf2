//! Decides, per incoming query, whether to answer from the zone table or
//! forward upstream, and correlates upstream replies back to their client.

use std::net::SocketAddr;
use std::time::Instant;

use bytes::BytesMut;
use dns_protocol::{build_local_answer, clear_aa, read_id, set_ra, write_id, Query, QTYPE_A, QTYPE_ANY};
use netd_common::ZoneTable;
use rand::Rng;

use crate::inflight::InFlightTable;

pub enum ClientAction {
    ReplyToClient(BytesMut),
    ForwardUpstream(BytesMut),
}

pub struct ForwarderEngine {
    zone: ZoneTable,
    inflight: InFlightTable,
}

impl ForwarderEngine {
    pub fn new(zone: ZoneTable) -> ForwarderEngine {
        ForwarderEngine {
            zone,
            inflight: InFlightTable::new(),
        }
    }

    /// Picks a 16-bit upstream-facing xid not already in the in-flight
    /// table by rejection sampling a uniform `[0, 65535]` draw (spec.md
    /// §4.3): collisions are possible but vanishingly unlikely against a
    /// table this small, and a miss just redraws.
    fn fresh_upstream_id(&self) -> u16 {
        let mut rng = rand::thread_rng();
        loop {
            let candidate = rng.gen::<u16>();
            if !self.inflight.contains(candidate) {
                return candidate;
            }
        }
    }

    /// A local-zone hit is only answered directly for QTYPE A or ANY — the
    /// zone table only ever holds A records, so any other QTYPE for a known
    /// name is still forwarded upstream.
    pub fn handle_client(&mut self, datagram: &[u8], client_addr: SocketAddr, now: Instant) -> Option<ClientAction> {
        let query = match Query::from_bytes(datagram) {
            Ok(query) => query,
            Err(error) => {
                log::debug!("dropping malformed DNS query from {}: {}", client_addr, error);
                return None;
            }
        };

        if matches!(query.qtype, QTYPE_A | QTYPE_ANY) {
            if let Some(record) = self.zone.get(&query.qname) {
                log::info!("answering {} locally for {}", query.qname, client_addr);
                return Some(ClientAction::ReplyToClient(build_local_answer(
                    &query,
                    &record.ip_list,
                    record.ttl,
                )));
            }
        }

        let mut forwarded = BytesMut::from(datagram);
        let local_id = self.fresh_upstream_id();
        self.inflight.insert(local_id, client_addr, query.id, now);
        write_id(&mut forwarded, local_id);
        set_ra(&mut forwarded);
        log::debug!("forwarding {} (qtype {}) for {}", query.qname, query.qtype, client_addr);
        Some(ClientAction::ForwardUpstream(forwarded))
    }

    /// Matches an upstream reply to the in-flight entry its (rewritten) ID
    /// names, restores the client's original transaction ID, and returns
    /// where to send it. `None` means the reply is stale or spurious.
    pub fn handle_upstream(&mut self, datagram: &[u8]) -> Option<(BytesMut, SocketAddr)> {
        let local_id = read_id(datagram)?;
        let entry = self.inflight.take(local_id)?;
        let mut reply = BytesMut::from(datagram);
        write_id(&mut reply, entry.original_id);
        clear_aa(&mut reply);
        Some((reply, entry.client_addr))
    }

    pub fn sweep_expired(&mut self, now: Instant) {
        self.inflight.sweep(now);
    }
}
