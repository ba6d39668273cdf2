//! The two-tier address allocator: a durable, persisted "leased" set plus an
//! in-memory, time-limited "reserved" set that covers the gap between a
//! DISCOVER and the REQUEST that should follow it.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::time::{Duration, Instant};

use netd_common::{BusyAddressSet, StoreError};

/// How long a DISCOVER's tentative offer holds an address before it's free
/// to offer to someone else. Never persisted, so a restart forgets it.
pub const RESERVATION_TTL: Duration = Duration::from_secs(45);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Ack,
    NakOutOfRange,
    NakAlreadyBusy,
}

pub struct LeasePool {
    pool_start: u32,
    pool_end: u32,
    leased: BusyAddressSet,
    reserved: HashMap<u32, Instant>,
}

impl LeasePool {
    pub fn new(pool_start: Ipv4Addr, pool_end: Ipv4Addr, leased: BusyAddressSet) -> LeasePool {
        LeasePool {
            pool_start: u32::from(pool_start),
            pool_end: u32::from(pool_end),
            leased,
            reserved: HashMap::new(),
        }
    }

    fn in_pool(&self, addr: u32) -> bool {
        addr >= self.pool_start && addr <= self.pool_end
    }

    fn reservation_live(&self, addr: u32, now: Instant) -> bool {
        self.reserved
            .get(&addr)
            .map(|reserved_at| now.duration_since(*reserved_at) < RESERVATION_TTL)
            .unwrap_or(false)
    }

    /// DISCOVER handling: the lowest free address in the pool, skipping
    /// anything durably leased or still tentatively reserved. The choice is
    /// reserved (in memory only) so a second DISCOVER racing the first
    /// doesn't get offered the same address.
    pub fn offer(&mut self, now: Instant) -> Option<Ipv4Addr> {
        for addr in self.pool_start..=self.pool_end {
            if self.leased.contains(addr) || self.reservation_live(addr, now) {
                continue;
            }
            self.reserved.insert(addr, now);
            return Some(Ipv4Addr::from(addr));
        }
        None
    }

    /// REQUEST handling: `requested` must be in range and not already
    /// durably leased. On success the address moves into the durable set,
    /// persisted before this returns, and its reservation (if any) is
    /// dropped. A persistence failure is reported alongside the outcome
    /// rather than changing it: the accept/reject decision never depends on
    /// whether the write succeeds.
    pub fn request(&mut self, requested: Ipv4Addr) -> (RequestOutcome, Option<StoreError>) {
        let addr = u32::from(requested);
        if !self.in_pool(addr) {
            return (RequestOutcome::NakOutOfRange, None);
        }
        if self.leased.contains(addr) {
            return (RequestOutcome::NakAlreadyBusy, None);
        }
        let persist_error = self.leased.insert_and_persist(addr).err();
        self.reserved.remove(&addr);
        (RequestOutcome::Ack, persist_error)
    }
}
