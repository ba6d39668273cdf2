//! Tracks client queries that were forwarded upstream, so the reply can be
//! routed back and its transaction ID restored.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// How long a forwarded query waits for an upstream reply before it's
/// abandoned. Swept once a second, not on every packet (spec.md §4.3).
pub const INFLIGHT_TTL: Duration = Duration::from_secs(5);

pub struct InFlightEntry {
    pub client_addr: SocketAddr,
    pub original_id: u16,
    pub inserted_at: Instant,
}

#[derive(Default)]
pub struct InFlightTable {
    entries: HashMap<u16, InFlightEntry>,
}

impl InFlightTable {
    pub fn new() -> InFlightTable {
        InFlightTable::default()
    }

    pub fn insert(&mut self, local_id: u16, client_addr: SocketAddr, original_id: u16, now: Instant) {
        self.entries.insert(
            local_id,
            InFlightEntry {
                client_addr,
                original_id,
                inserted_at: now,
            },
        );
    }

    pub fn take(&mut self, local_id: u16) -> Option<InFlightEntry> {
        self.entries.remove(&local_id)
    }

    pub fn contains(&self, local_id: u16) -> bool {
        self.entries.contains_key(&local_id)
    }

    pub fn sweep(&mut self, now: Instant) {
        self.entries
            .retain(|_, entry| now.duration_since(entry.inserted_at) < INFLIGHT_TTL);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
