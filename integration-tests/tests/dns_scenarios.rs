//! Cross-crate DNS forwarder scenarios: local-zone answers, forwarding
//! decisions, and ID-based reply correlation.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Instant;

use bytes::{BufMut, BytesMut};
use dns_protocol::{read_id, QTYPE_A};
use dns_server::{ClientAction, ForwarderEngine};
use netd_common::{ZoneRecord, ZoneTable};

fn client_addr(port: u16) -> SocketAddr {
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::new(10, 0, 0, 5), port))
}

fn encode_query(id: u16, name: &str, qtype: u16) -> BytesMut {
    let mut buf = BytesMut::new();
    buf.put_u16(id);
    buf.put_u16(0x0100);
    buf.put_u16(1);
    buf.put_u16(0);
    buf.put_u16(0);
    buf.put_u16(0);
    for label in name.split('.') {
        buf.put_u8(label.len() as u8);
        buf.put_slice(label.as_bytes());
    }
    buf.put_u8(0);
    buf.put_u16(qtype);
    buf.put_u16(1);
    buf
}

fn zone_with(name: &str, ip: Ipv4Addr) -> ZoneTable {
    let mut zone = ZoneTable::new();
    zone.insert(
        name.to_string(),
        ZoneRecord {
            ip_list: vec![ip],
            ttl: 300,
        },
    );
    zone
}

/// A query for a name in the local zone table is answered without ever
/// touching the upstream leg.
#[test]
fn zone_hit_is_answered_locally() {
    let mut engine = ForwarderEngine::new(zone_with("router.lan", Ipv4Addr::new(192, 168, 1, 1)));
    let query = encode_query(0x1111, "router.lan", QTYPE_A);

    match engine.handle_client(&query, client_addr(5000), Instant::now()) {
        Some(ClientAction::ReplyToClient(reply)) => {
            assert_eq!(read_id(&reply), Some(0x1111));
        }
        _ => panic!("expected a local answer"),
    }
}

/// A query for a name outside the zone table is forwarded, and the
/// eventual upstream reply is routed back to the right client with its
/// original transaction ID restored.
#[test]
fn forwarded_query_round_trips_back_to_the_client() {
    let mut engine = ForwarderEngine::new(ZoneTable::new());
    let query = encode_query(0x2222, "example.com", QTYPE_A);

    let forwarded = match engine.handle_client(&query, client_addr(6000), Instant::now()) {
        Some(ClientAction::ForwardUpstream(bytes)) => bytes,
        _ => panic!("expected a forward"),
    };
    assert_ne!(read_id(&forwarded), Some(0x2222));

    // The upstream resolver answers with whatever ID we forwarded under.
    let mut upstream_reply = forwarded.clone();
    upstream_reply[3] = 0x81; // flip QR/RA-ish bits, irrelevant to routing

    let (reply, addr) = engine
        .handle_upstream(&upstream_reply)
        .expect("matches the in-flight entry");
    assert_eq!(addr, client_addr(6000));
    assert_eq!(read_id(&reply), Some(0x2222));
}

/// A second client's concurrent query for a different name gets its own
/// in-flight slot and its own reply, without cross-talk.
#[test]
fn two_concurrent_forwards_do_not_cross_wires() {
    let mut engine = ForwarderEngine::new(ZoneTable::new());

    let first_forward = match engine.handle_client(&encode_query(1, "a.test", QTYPE_A), client_addr(1), Instant::now()) {
        Some(ClientAction::ForwardUpstream(bytes)) => bytes,
        _ => panic!("expected a forward"),
    };
    let second_forward = match engine.handle_client(&encode_query(2, "b.test", QTYPE_A), client_addr(2), Instant::now()) {
        Some(ClientAction::ForwardUpstream(bytes)) => bytes,
        _ => panic!("expected a forward"),
    };

    let (_, addr_for_second) = engine.handle_upstream(&second_forward).unwrap();
    let (_, addr_for_first) = engine.handle_upstream(&first_forward).unwrap();
    assert_eq!(addr_for_second, client_addr(2));
    assert_eq!(addr_for_first, client_addr(1));
}

/// A name present in the zone table but queried with an unsupported QTYPE
/// still forwards, since the zone table only ever holds A records.
#[test]
fn zone_hit_with_unsupported_qtype_still_forwards() {
    let mut engine = ForwarderEngine::new(zone_with("router.lan", Ipv4Addr::new(192, 168, 1, 1)));
    let query = encode_query(5, "router.lan", 15); // MX

    match engine.handle_client(&query, client_addr(7000), Instant::now()) {
        Some(ClientAction::ForwardUpstream(_)) => {}
        _ => panic!("expected a forward for an unsupported qtype"),
    }
}
