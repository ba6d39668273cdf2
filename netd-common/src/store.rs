//! The concrete form of spec.md §4.4's "state store adapter": JSON
//! load/save for the DHCP busy-address set and the DNS zone table. A
//! missing file yields an empty container; malformed JSON is fatal.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A zone table entry: the A records and TTL served for one FQDN.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ZoneRecord {
    #[serde(rename = "IP")]
    pub ip_list: Vec<Ipv4Addr>,
    #[serde(rename = "TTL")]
    pub ttl: u32,
}

/// FQDN (lowercase, no trailing dot) → its A records.
pub type ZoneTable = HashMap<String, ZoneRecord>;

/// Loads the zone table. A missing file is not an error: it yields an empty
/// table and materializes an empty `{}` at `path`, matching spec.md §3/§4.4
/// ("empty table (created)") and the original's first-run behavior.
pub fn load_zone_table(path: impl AsRef<Path>) -> Result<ZoneTable, StoreError> {
    let path = path.as_ref();
    let path_str = path.display().to_string();

    let raw: HashMap<String, ZoneRecord> = match fs::read(path) {
        Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| StoreError::Json {
            path: path_str.clone(),
            source,
        })?,
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            if let Err(error) = fs::write(path, b"{}") {
                log::warn!("could not create empty zone file {}: {}", path_str, error);
            }
            return Ok(ZoneTable::new());
        }
        Err(source) => {
            return Err(StoreError::Io {
                path: path_str,
                source,
            })
        }
    };

    Ok(raw
        .into_iter()
        .map(|(name, record)| (normalize_fqdn(&name), record))
        .collect())
}

/// Lowercases and strips a single trailing dot, matching spec.md's FQDN
/// convention for zone keys and incoming QNAMEs alike.
pub fn normalize_fqdn(name: &str) -> String {
    name.trim_end_matches('.').to_ascii_lowercase()
}

/// The durable set of IPv4 addresses the DHCP engine has ACKed out, backed
/// by a JSON array on disk (spec.md §3/§4.2). Ordered-insertion with set
/// semantics: `order` is what gets persisted, `members` is for O(1)
/// membership checks.
#[derive(Debug)]
pub struct BusyAddressSet {
    path: PathBuf,
    order: Vec<u32>,
    members: HashSet<u32>,
}

impl BusyAddressSet {
    /// Loads the busy-address set from `path`. Absent file ⇒ empty set.
    pub fn load(path: impl Into<PathBuf>) -> Result<BusyAddressSet, StoreError> {
        let path = path.into();
        let path_str = path.display().to_string();

        let order: Vec<u32> = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| StoreError::Json {
                path: path_str.clone(),
                source,
            })?,
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(source) => {
                return Err(StoreError::Io {
                    path: path_str,
                    source,
                })
            }
        };
        let members = order.iter().copied().collect();

        Ok(BusyAddressSet {
            path,
            order,
            members,
        })
    }

    pub fn contains(&self, addr: u32) -> bool {
        self.members.contains(&addr)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Marks `addr` busy and rewrites the file in full, synchronously,
    /// before returning — spec.md §4.2 requires this to happen before the
    /// ACK that triggered it is sent. A write failure is surfaced to the
    /// caller, who (per spec.md §4.2/§7) logs it but still sends the ACK.
    pub fn insert_and_persist(&mut self, addr: u32) -> Result<(), StoreError> {
        if self.members.insert(addr) {
            self.order.push(addr);
            self.persist()?;
        }
        Ok(())
    }

    fn persist(&self) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(&self.order).expect("Vec<u32> always serializes");
        fs::write(&self.path, bytes).map_err(|source| StoreError::Io {
            path: self.path.display().to_string(),
            source,
        })
    }
}
