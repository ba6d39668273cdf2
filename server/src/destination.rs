//! RFC 2131 §4.1 destination selection for server replies.

use std::net::Ipv4Addr;

use dhcp_protocol::{Message, DHCP_PORT_CLIENT, DHCP_PORT_SERVER};

/// Where to send an OFFER or ACK, in the order RFC 2131 §4.1 specifies:
/// relay first, then a client that already has an IP, then a plain unicast
/// to the offered/confirmed address, and only then broadcast. Unlike the
/// BPF/ARP-injection path this server's teacher used on some platforms, a
/// plain UDP socket already gets kernel ARP resolution for free on a
/// same-subnet unicast send, so there's no need to substitute broadcast for
/// case three.
pub fn unicast_or_broadcast(
    request: &Message,
    response: &Message,
    subnet_mask: Ipv4Addr,
    server_ip: Ipv4Addr,
) -> (Ipv4Addr, u16) {
    if !request.gateway_ip_address.is_unspecified() {
        return (request.gateway_ip_address, DHCP_PORT_SERVER);
    }
    if !request.client_ip_address.is_unspecified() {
        return (request.client_ip_address, DHCP_PORT_CLIENT);
    }
    if !request.is_broadcast {
        return (response.your_ip_address, DHCP_PORT_CLIENT);
    }
    (directed_broadcast(server_ip, subnet_mask), DHCP_PORT_CLIENT)
}

/// NAK always broadcasts, regardless of giaddr/ciaddr/the broadcast flag.
pub fn nak_destination(server_ip: Ipv4Addr, subnet_mask: Ipv4Addr) -> (Ipv4Addr, u16) {
    (directed_broadcast(server_ip, subnet_mask), DHCP_PORT_CLIENT)
}

fn directed_broadcast(ip: Ipv4Addr, mask: Ipv4Addr) -> Ipv4Addr {
    let ip = u32::from(ip);
    let mask = u32::from(mask);
    Ipv4Addr::from((ip & mask) | !mask)
}
