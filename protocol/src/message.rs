//! The fixed BOOTP header plus options (RFC 2131 §2,§3,§4.1).

use std::net::Ipv4Addr;

use bytes::{BufMut, BytesMut};
use eui48::MacAddress;

use crate::error::DecodeError;
use crate::options::{MessageType, Options};
use crate::MAGIC_COOKIE;

/// Size of the fixed BOOTP header, before the magic cookie and options.
pub const HEADER_LEN: usize = 236;
/// Size of the header plus the magic cookie: where options begin.
pub const OPTIONS_OFFSET: usize = HEADER_LEN + 4;

const CHADDR_LEN: usize = 16;
const SNAME_OFFSET: usize = 44;
const SNAME_LEN: usize = 64;
const FILE_OFFSET: usize = SNAME_OFFSET + SNAME_LEN;
const FILE_LEN: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationCode {
    BootRequest = 1,
    BootReply = 2,
}

/// The link-layer type in `htype`. Only Ethernet is meaningful to this
/// server; anything else round-trips as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareType {
    Ethernet,
    Other(u8),
}

impl HardwareType {
    fn from_u8(value: u8) -> HardwareType {
        match value {
            1 => HardwareType::Ethernet,
            other => HardwareType::Other(other),
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            HardwareType::Ethernet => 1,
            HardwareType::Other(value) => value,
        }
    }
}

/// A decoded DHCP/BOOTP frame: header fields plus options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub operation_code: OperationCode,
    pub hardware_type: HardwareType,
    pub hardware_address_length: u8,
    pub hops: u8,
    pub transaction_id: u32,
    pub seconds: u16,
    pub is_broadcast: bool,
    pub client_ip_address: Ipv4Addr,
    pub your_ip_address: Ipv4Addr,
    pub server_ip_address: Ipv4Addr,
    pub gateway_ip_address: Ipv4Addr,
    pub client_hardware_address: MacAddress,
    /// Raw `sname` bytes (64), carried through unchanged. Legacy BOOTP
    /// server-name field; this server never sets it itself, but a reply
    /// must still echo whatever the request carried (spec.md §3).
    pub server_name: Vec<u8>,
    /// Raw `file` bytes (128), carried through unchanged. Same rationale
    /// as `server_name`.
    pub boot_filename: Vec<u8>,
    pub options: Options,
}

impl Message {
    /// Decodes a datagram into a `Message`. Rejects truncated headers, a bad
    /// magic cookie, and an options section with no end marker. Unknown
    /// option codes are skipped, not rejected.
    pub fn from_bytes(buf: &[u8]) -> Result<Message, DecodeError> {
        if buf.len() < OPTIONS_OFFSET {
            return Err(DecodeError::Truncated { len: buf.len() });
        }

        let magic = u32::from_be_bytes([buf[236], buf[237], buf[238], buf[239]]);
        if magic != MAGIC_COOKIE {
            return Err(DecodeError::BadMagicCookie { found: magic });
        }

        let operation_code = match buf[0] {
            2 => OperationCode::BootReply,
            _ => OperationCode::BootRequest,
        };
        let hardware_type = HardwareType::from_u8(buf[1]);
        let hardware_address_length = buf[2];
        let hops = buf[3];
        let transaction_id = u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]);
        let seconds = u16::from_be_bytes([buf[8], buf[9]]);
        let flags = u16::from_be_bytes([buf[10], buf[11]]);
        let is_broadcast = flags & 0x8000 != 0;
        let client_ip_address = ipv4_at(buf, 12);
        let your_ip_address = ipv4_at(buf, 16);
        let server_ip_address = ipv4_at(buf, 20);
        let gateway_ip_address = ipv4_at(buf, 24);
        let client_hardware_address =
            MacAddress::new([buf[28], buf[29], buf[30], buf[31], buf[32], buf[33]]);
        let server_name = buf[SNAME_OFFSET..SNAME_OFFSET + SNAME_LEN].to_vec();
        let boot_filename = buf[FILE_OFFSET..FILE_OFFSET + FILE_LEN].to_vec();

        let options = parse_options(&buf[OPTIONS_OFFSET..])?;

        Ok(Message {
            operation_code,
            hardware_type,
            hardware_address_length,
            hops,
            transaction_id,
            seconds,
            is_broadcast,
            client_ip_address,
            your_ip_address,
            server_ip_address,
            gateway_ip_address,
            client_hardware_address,
            server_name,
            boot_filename,
            options,
        })
    }

    /// Encodes this frame, header followed by options followed by the 0xFF
    /// end marker. `server_name`/`boot_filename` are echoed back verbatim,
    /// short-padded with zeros if the caller built a `Message` by hand with
    /// fewer than the full 64/128 bytes.
    pub fn to_bytes(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(OPTIONS_OFFSET + 64);

        buf.put_u8(match self.operation_code {
            OperationCode::BootRequest => 1,
            OperationCode::BootReply => 2,
        });
        buf.put_u8(self.hardware_type.as_u8());
        buf.put_u8(self.hardware_address_length);
        buf.put_u8(self.hops);
        buf.put_u32(self.transaction_id);
        buf.put_u16(self.seconds);
        buf.put_u16(if self.is_broadcast { 0x8000 } else { 0 });
        buf.put_slice(&self.client_ip_address.octets());
        buf.put_slice(&self.your_ip_address.octets());
        buf.put_slice(&self.server_ip_address.octets());
        buf.put_slice(&self.gateway_ip_address.octets());
        buf.put_slice(self.client_hardware_address.as_bytes());
        buf.put_slice(&[0u8; CHADDR_LEN - 6]);
        put_padded(&mut buf, &self.server_name, SNAME_LEN);
        put_padded(&mut buf, &self.boot_filename, FILE_LEN);
        buf.put_u32(MAGIC_COOKIE);

        write_options(&mut buf, &self.options);

        buf
    }
}

fn ipv4_at(buf: &[u8], offset: usize) -> Ipv4Addr {
    Ipv4Addr::new(buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3])
}

/// Writes `field` into `buf`, truncated or zero-padded to exactly `len`
/// bytes — `sname`/`file` are fixed-width on the wire regardless of how
/// many bytes a hand-built `Message` supplies.
fn put_padded(buf: &mut BytesMut, field: &[u8], len: usize) {
    let copy_len = field.len().min(len);
    buf.put_slice(&field[..copy_len]);
    buf.put_slice(&vec![0u8; len - copy_len]);
}

fn parse_options(buf: &[u8]) -> Result<Options, DecodeError> {
    let mut options = Options::default();
    let mut i = 0;
    let mut saw_end = false;

    while i < buf.len() {
        let tag = buf[i];
        if tag == 0 {
            i += 1;
            continue;
        }
        if tag == 255 {
            saw_end = true;
            break;
        }
        if i + 1 >= buf.len() {
            return Err(DecodeError::OptionOverrun { tag, offset: i, len: 0 });
        }
        let len = buf[i + 1] as usize;
        let start = i + 2;
        let end = start + len;
        if end > buf.len() {
            return Err(DecodeError::OptionOverrun { tag, offset: i, len });
        }
        let data = &buf[start..end];

        match tag {
            1 if len == 4 => options.subnet_mask = Some(ipv4_at(data, 0)),
            3 if len >= 4 => options.router = Some(ipv4_at(data, 0)),
            6 if len >= 4 && len % 4 == 0 => {
                options.domain_name_servers =
                    Some(data.chunks_exact(4).map(|c| ipv4_at(c, 0)).collect());
            }
            50 if len == 4 => options.requested_address = Some(ipv4_at(data, 0)),
            51 if len == 4 => {
                options.lease_time =
                    Some(u32::from_be_bytes([data[0], data[1], data[2], data[3]]));
            }
            53 if len == 1 => options.message_type = MessageType::from_u8(data[0]),
            54 if len == 4 => options.server_id = Some(ipv4_at(data, 0)),
            55 => options.parameter_list = Some(data.to_vec()),
            56 => options.message = Some(String::from_utf8_lossy(data).into_owned()),
            57 if len == 2 => {
                options.max_message_size = Some(u16::from_be_bytes([data[0], data[1]]));
            }
            61 => options.client_id = Some(data.to_vec()),
            _ => {}
        }

        i = end;
    }

    if !saw_end {
        return Err(DecodeError::MissingEndOption);
    }

    Ok(options)
}

fn write_options(buf: &mut BytesMut, options: &Options) {
    if let Some(message_type) = options.message_type {
        buf.put_u8(53);
        buf.put_u8(1);
        buf.put_u8(message_type as u8);
    }
    if let Some(server_id) = options.server_id {
        buf.put_u8(54);
        buf.put_u8(4);
        buf.put_slice(&server_id.octets());
    }
    if let Some(lease_time) = options.lease_time {
        buf.put_u8(51);
        buf.put_u8(4);
        buf.put_u32(lease_time);
    }
    if let Some(subnet_mask) = options.subnet_mask {
        buf.put_u8(1);
        buf.put_u8(4);
        buf.put_slice(&subnet_mask.octets());
    }
    if let Some(router) = options.router {
        buf.put_u8(3);
        buf.put_u8(4);
        buf.put_slice(&router.octets());
    }
    if let Some(ref servers) = options.domain_name_servers {
        buf.put_u8(6);
        buf.put_u8((servers.len() * 4) as u8);
        for server in servers {
            buf.put_slice(&server.octets());
        }
    }
    if let Some(requested_address) = options.requested_address {
        buf.put_u8(50);
        buf.put_u8(4);
        buf.put_slice(&requested_address.octets());
    }
    if let Some(max_message_size) = options.max_message_size {
        buf.put_u8(57);
        buf.put_u8(2);
        buf.put_u16(max_message_size);
    }
    if let Some(ref client_id) = options.client_id {
        buf.put_u8(61);
        buf.put_u8(client_id.len() as u8);
        buf.put_slice(client_id);
    }
    if let Some(ref parameter_list) = options.parameter_list {
        buf.put_u8(55);
        buf.put_u8(parameter_list.len() as u8);
        buf.put_slice(parameter_list);
    }
    if let Some(ref message) = options.message {
        buf.put_u8(56);
        buf.put_u8(message.len() as u8);
        buf.put_slice(message.as_bytes());
    }
    buf.put_u8(255);
}
