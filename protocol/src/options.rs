//! DHCP options (RFC 2132). Only the tags this server reads or writes are
//! given names; anything else decodes fine but is silently ignored, per
//! spec.

use std::net::Ipv4Addr;

/// Numeric option codes this implementation cares about.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionTag {
    SubnetMask = 1,
    Router = 3,
    DomainNameServers = 6,
    RequestedAddress = 50,
    AddressTime = 51,
    MessageType = 53,
    ServerId = 54,
    ParameterList = 55,
    Message = 56,
    MaxMessageSize = 57,
    ClientId = 61,
    End = 255,
}

/// DHCP message type, option 53. RFC 2132 §9.6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Discover = 1,
    Offer = 2,
    Request = 3,
    Decline = 4,
    Ack = 5,
    Nak = 6,
    Release = 7,
    Inform = 8,
}

impl MessageType {
    pub fn from_u8(value: u8) -> Option<MessageType> {
        use MessageType::*;
        Some(match value {
            1 => Discover,
            2 => Offer,
            3 => Request,
            4 => Decline,
            5 => Ack,
            6 => Nak,
            7 => Release,
            8 => Inform,
            _ => return None,
        })
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MessageType::Discover => "DHCPDISCOVER",
            MessageType::Offer => "DHCPOFFER",
            MessageType::Request => "DHCPREQUEST",
            MessageType::Decline => "DHCPDECLINE",
            MessageType::Ack => "DHCPACK",
            MessageType::Nak => "DHCPNAK",
            MessageType::Release => "DHCPRELEASE",
            MessageType::Inform => "DHCPINFORM",
        };
        write!(f, "{}", name)
    }
}

/// The decoded options block of a DHCP frame.
///
/// A request carries `requested_address`/`parameter_list`/`client_id`/
/// `max_message_size`; a reply built by this server carries
/// `message_type`/`server_id` plus whichever of `lease_time`, `subnet_mask`,
/// `router`, `domain_name_servers` (OFFER/ACK) or `message` (NAK) apply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    pub message_type: Option<MessageType>,
    pub server_id: Option<Ipv4Addr>,
    pub lease_time: Option<u32>,
    pub subnet_mask: Option<Ipv4Addr>,
    pub router: Option<Ipv4Addr>,
    pub domain_name_servers: Option<Vec<Ipv4Addr>>,
    pub requested_address: Option<Ipv4Addr>,
    pub message: Option<String>,
    pub client_id: Option<Vec<u8>>,
    pub parameter_list: Option<Vec<u8>>,
    pub max_message_size: Option<u16>,
}
