//! DNS wire format (RFC 1035 §4): the 12-byte header and a single question.
//! Decoding never expects compression pointers in the question name; answers
//! this crate builds always point the name back at offset 12 with `0xC00C`.

use std::net::Ipv4Addr;

use bytes::{BufMut, BytesMut};

use crate::error::DecodeError;

pub const HEADER_LEN: usize = 12;
/// Where the answer's owner name always points: the question starts right
/// after the header, on every datagram this crate builds.
const QUESTION_NAME_POINTER: u16 = 0xC00C;

pub const QTYPE_A: u16 = 1;
pub const QTYPE_ANY: u16 = 255;
const QCLASS_IN: u16 = 1;
const RTYPE_A: u16 = 1;

/// A decoded query: the header fields this server reads, plus its single
/// question. `qname_wire` keeps the original label encoding so replies can
/// echo the question section byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub id: u16,
    pub recursion_desired: bool,
    pub qname: String,
    pub qname_wire: Vec<u8>,
    pub qtype: u16,
    pub qclass: u16,
    /// NSCOUNT as received. A local-zone reply re-emits this unchanged
    /// (spec.md §4.1: only ANCOUNT is recomputed).
    pub nscount: u16,
    /// ARCOUNT as received, re-emitted unchanged for the same reason.
    pub arcount: u16,
}

impl Query {
    /// Parses the header and first question. A header claiming zero
    /// questions is rejected; additional questions beyond the first are
    /// ignored, matching how this server only ever answers or forwards a
    /// single question.
    pub fn from_bytes(buf: &[u8]) -> Result<Query, DecodeError> {
        if buf.len() < HEADER_LEN {
            return Err(DecodeError::HeaderTruncated { len: buf.len() });
        }

        let id = u16::from_be_bytes([buf[0], buf[1]]);
        let flags = u16::from_be_bytes([buf[2], buf[3]]);
        let recursion_desired = flags & 0x0100 != 0;
        let qdcount = u16::from_be_bytes([buf[4], buf[5]]);
        if qdcount == 0 {
            return Err(DecodeError::MissingQuestion { qdcount });
        }
        let nscount = u16::from_be_bytes([buf[8], buf[9]]);
        let arcount = u16::from_be_bytes([buf[10], buf[11]]);

        let (qname, qname_wire, offset) = read_name(buf, HEADER_LEN)?;
        if offset + 4 > buf.len() {
            return Err(DecodeError::QuestionTruncated { offset });
        }
        let qtype = u16::from_be_bytes([buf[offset], buf[offset + 1]]);
        let qclass = u16::from_be_bytes([buf[offset + 2], buf[offset + 3]]);

        Ok(Query {
            id,
            recursion_desired,
            qname,
            qname_wire,
            qtype,
            qclass,
            nscount,
            arcount,
        })
    }
}

/// Reads a sequence of length-prefixed labels starting at `offset`, up to
/// the terminating zero-length label. Returns the dotted, lowercased name,
/// the raw wire bytes (labels plus terminator), and the offset just past
/// the terminator.
fn read_name(buf: &[u8], offset: usize) -> Result<(String, Vec<u8>, usize), DecodeError> {
    let mut labels = Vec::new();
    let mut wire = Vec::new();
    let mut i = offset;

    loop {
        if i >= buf.len() {
            return Err(DecodeError::LabelOverrun { offset: i });
        }
        let len = buf[i];
        if len & 0xC0 != 0 {
            return Err(DecodeError::CompressedQuestionUnsupported { offset: i });
        }
        if len == 0 {
            wire.push(0);
            i += 1;
            break;
        }
        let len = len as usize;
        if len > 63 {
            return Err(DecodeError::LabelTooLong { offset: i, len });
        }
        let start = i + 1;
        let end = start + len;
        if end > buf.len() {
            return Err(DecodeError::LabelOverrun { offset: i });
        }
        labels.push(String::from_utf8_lossy(&buf[start..end]).to_ascii_lowercase());
        wire.extend_from_slice(&buf[i..end]);
        i = end;
    }

    Ok((labels.join("."), wire, i))
}

/// Builds a full authoritative-style reply for a local-zone hit: the
/// question echoed back, one A record per address, owner name compressed
/// to point at the question. NSCOUNT/ARCOUNT are re-emitted exactly as the
/// query carried them — only ANCOUNT is recomputed (spec.md §4.1: "original
/// counts (modulo updated ANCOUNT)").
pub fn build_local_answer(query: &Query, addresses: &[Ipv4Addr], ttl: u32) -> BytesMut {
    let mut buf = BytesMut::with_capacity(HEADER_LEN + query.qname_wire.len() + 4 + addresses.len() * 16);

    buf.put_u16(query.id);
    // QR=1, AA=1, RA=1, RD copied from the question (spec.md §4.3, S4).
    let flags: u16 = 0x8480 | if query.recursion_desired { 0x0100 } else { 0 };
    buf.put_u16(flags);
    buf.put_u16(1); // QDCOUNT
    buf.put_u16(addresses.len() as u16); // ANCOUNT
    buf.put_u16(query.nscount);
    buf.put_u16(query.arcount);

    buf.put_slice(&query.qname_wire);
    buf.put_u16(query.qtype);
    buf.put_u16(query.qclass);

    for address in addresses {
        buf.put_u16(QUESTION_NAME_POINTER);
        buf.put_u16(RTYPE_A);
        buf.put_u16(QCLASS_IN);
        buf.put_u32(ttl);
        buf.put_u16(4);
        buf.put_slice(&address.octets());
    }

    buf
}

/// Reads the 16-bit transaction ID from a raw datagram, for in-flight
/// correlation on the upstream leg.
pub fn read_id(buf: &[u8]) -> Option<u16> {
    if buf.len() < 2 {
        return None;
    }
    Some(u16::from_be_bytes([buf[0], buf[1]]))
}

/// Overwrites the 16-bit transaction ID of a raw datagram in place. Used
/// both to substitute a locally-generated ID before forwarding upstream,
/// and to restore the client's original ID before relaying the reply back.
pub fn write_id(buf: &mut [u8], id: u16) -> bool {
    if buf.len() < 2 {
        return false;
    }
    let bytes = id.to_be_bytes();
    buf[0] = bytes[0];
    buf[1] = bytes[1];
    true
}

/// Clears the AA bit (byte 2, bit 0x04) of a raw datagram's flag word: an
/// upstream reply we relay back no longer claims this server as an
/// authority for the answer it carries.
pub fn clear_aa(buf: &mut [u8]) -> bool {
    if buf.len() < 3 {
        return false;
    }
    buf[2] &= !0x04;
    true
}

/// Sets the RA bit (byte 3, bit 0x80) of a raw datagram's flag word: set on
/// a query before it's forwarded upstream, since this server always offers
/// recursion (spec.md §4.3).
pub fn set_ra(buf: &mut [u8]) -> bool {
    if buf.len() < 4 {
        return false;
    }
    buf[3] |= 0x80;
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_query(id: u16, rd: bool, name: &str, qtype: u16) -> BytesMut {
        let mut buf = BytesMut::new();
        buf.put_u16(id);
        buf.put_u16(if rd { 0x0100 } else { 0 });
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
        buf.put_u16(QCLASS_IN);
        buf
    }

    #[test]
    fn parses_a_well_formed_query() {
        let bytes = encode_query(0xBEEF, true, "host.example.test", QTYPE_A);
        let query = Query::from_bytes(&bytes).unwrap();
        assert_eq!(query.id, 0xBEEF);
        assert!(query.recursion_desired);
        assert_eq!(query.qname, "host.example.test");
        assert_eq!(query.qtype, QTYPE_A);
    }

    #[test]
    fn lowercases_the_name() {
        let bytes = encode_query(1, false, "Host.EXAMPLE.test", QTYPE_A);
        let query = Query::from_bytes(&bytes).unwrap();
        assert_eq!(query.qname, "host.example.test");
    }

    #[test]
    fn rejects_a_truncated_header() {
        let err = Query::from_bytes(&[0u8; 4]).unwrap_err();
        assert!(matches!(err, DecodeError::HeaderTruncated { len: 4 }));
    }

    #[test]
    fn rejects_zero_questions() {
        let mut buf = BytesMut::new();
        buf.put_u16(1);
        buf.put_u16(0);
        buf.put_u16(0);
        buf.put_u16(0);
        buf.put_u16(0);
        buf.put_u16(0);
        let err = Query::from_bytes(&buf).unwrap_err();
        assert!(matches!(err, DecodeError::MissingQuestion { qdcount: 0 }));
    }

    #[test]
    fn rejects_a_compressed_question_name() {
        let mut bytes = encode_query(1, false, "host.test", QTYPE_A).to_vec();
        bytes[HEADER_LEN] = 0xC0;
        let err = Query::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, DecodeError::CompressedQuestionUnsupported { .. }));
    }

    #[test]
    fn builds_a_local_answer_with_one_record_per_address() {
        let bytes = encode_query(0x1234, true, "host.test", QTYPE_A);
        let query = Query::from_bytes(&bytes).unwrap();
        let reply = build_local_answer(&query, &[Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 2)], 300);

        assert_eq!(u16::from_be_bytes([reply[0], reply[1]]), 0x1234);
        assert_eq!(u16::from_be_bytes([reply[6], reply[7]]), 2);
        let answers_start = HEADER_LEN + query.qname_wire.len() + 4;
        assert_eq!(&reply[answers_start..answers_start + 2], &0xC00Cu16.to_be_bytes());
    }

    #[test]
    fn local_answer_re_emits_the_querys_nscount_and_arcount_unchanged() {
        let mut bytes = encode_query(0x1234, true, "host.test", QTYPE_A);
        bytes[8..10].copy_from_slice(&3u16.to_be_bytes()); // NSCOUNT
        bytes[10..12].copy_from_slice(&2u16.to_be_bytes()); // ARCOUNT
        let query = Query::from_bytes(&bytes).unwrap();
        assert_eq!(query.nscount, 3);
        assert_eq!(query.arcount, 2);

        let reply = build_local_answer(&query, &[Ipv4Addr::new(10, 0, 0, 1)], 300);
        assert_eq!(u16::from_be_bytes([reply[6], reply[7]]), 1); // ANCOUNT recomputed
        assert_eq!(u16::from_be_bytes([reply[8], reply[9]]), 3); // NSCOUNT carried
        assert_eq!(u16::from_be_bytes([reply[10], reply[11]]), 2); // ARCOUNT carried
    }

    #[test]
    fn write_id_round_trips_through_read_id() {
        let mut bytes = encode_query(1, false, "host.test", QTYPE_A);
        assert!(write_id(&mut bytes, 0xABCD));
        assert_eq!(read_id(&bytes), Some(0xABCD));
    }

    #[test]
    fn clear_aa_only_touches_the_aa_bit() {
        let mut bytes = encode_query(1, true, "host.test", QTYPE_A);
        bytes[2] |= 0x04;
        let before_rd = bytes[2] & 0x01;
        assert!(clear_aa(&mut bytes));
        assert_eq!(bytes[2] & 0x04, 0);
        assert_eq!(bytes[2] & 0x01, before_rd);
    }

    #[test]
    fn set_ra_only_touches_the_ra_bit() {
        let mut bytes = encode_query(1, true, "host.test", QTYPE_A);
        let before_low_byte_rest = bytes[3] & 0x7F;
        assert!(set_ra(&mut bytes));
        assert_eq!(bytes[3] & 0x80, 0x80);
        assert_eq!(bytes[3] & 0x7F, before_low_byte_rest);
    }

    #[test]
    fn build_local_answer_sets_qr_aa_ra_and_copies_rd() {
        let bytes = encode_query(0x1234, true, "host.test", QTYPE_A);
        let query = Query::from_bytes(&bytes).unwrap();
        let reply = build_local_answer(&query, &[Ipv4Addr::new(10, 0, 0, 1)], 300);
        let flags = u16::from_be_bytes([reply[2], reply[3]]);
        assert_eq!(flags & 0x8000, 0x8000, "QR");
        assert_eq!(flags & 0x0400, 0x0400, "AA");
        assert_eq!(flags & 0x0080, 0x0080, "RA");
        assert_eq!(flags & 0x0100, 0x0100, "RD copied from the query");
    }
}
