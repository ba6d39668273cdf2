//! Builds OFFER/ACK/NAK replies. Every header field of the request carries
//! through to the reply unchanged except `operation_code` (-> BootReply)
//! and `your_ip_address` (-> the offered/confirmed address, or cleared for
//! a NAK) — spec.md §3. Option order within each reply matches
//! `dhcp_protocol::Message::to_bytes`'s fixed emission order, which is
//! already 53, 54, 51, 1, 3, 6 for the fields this builder sets.

use std::net::Ipv4Addr;

use dhcp_protocol::{Message, MessageType, OperationCode, Options};

pub struct MessageBuilder {
    server_ip: Ipv4Addr,
    subnet_mask: Ipv4Addr,
    router_ip: Ipv4Addr,
    dns_ip: Ipv4Addr,
    lease_seconds: u32,
}

impl MessageBuilder {
    pub fn new(
        server_ip: Ipv4Addr,
        subnet_mask: Ipv4Addr,
        router_ip: Ipv4Addr,
        dns_ip: Ipv4Addr,
        lease_seconds: u32,
    ) -> MessageBuilder {
        MessageBuilder {
            server_ip,
            subnet_mask,
            router_ip,
            dns_ip,
            lease_seconds,
        }
    }

    pub fn offer(&self, discover: &Message, offered: Ipv4Addr) -> Message {
        self.reply(discover, MessageType::Offer, offered)
    }

    pub fn ack(&self, request: &Message, confirmed: Ipv4Addr) -> Message {
        self.reply(request, MessageType::Ack, confirmed)
    }

    /// `yiaddr` is left at 0.0.0.0; the only options are 53=6, 54 and 56.
    pub fn nak(&self, request: &Message) -> Message {
        let mut options = Options::default();
        options.message_type = Some(MessageType::Nak);
        options.server_id = Some(self.server_ip);
        options.message = Some("address not available".to_string());

        Message {
            operation_code: OperationCode::BootReply,
            hardware_type: request.hardware_type,
            hardware_address_length: request.hardware_address_length,
            hops: request.hops,
            transaction_id: request.transaction_id,
            seconds: request.seconds,
            is_broadcast: request.is_broadcast,
            client_ip_address: request.client_ip_address,
            your_ip_address: Ipv4Addr::new(0, 0, 0, 0),
            server_ip_address: request.server_ip_address,
            gateway_ip_address: request.gateway_ip_address,
            client_hardware_address: request.client_hardware_address,
            server_name: request.server_name.clone(),
            boot_filename: request.boot_filename.clone(),
            options,
        }
    }

    fn reply(&self, request: &Message, message_type: MessageType, yiaddr: Ipv4Addr) -> Message {
        let mut options = Options::default();
        options.message_type = Some(message_type);
        options.server_id = Some(self.server_ip);
        options.lease_time = Some(self.lease_seconds);
        options.subnet_mask = Some(self.subnet_mask);
        options.router = Some(self.router_ip);
        // Two entries, the second always 0.0.0.0: matches the legacy
        // reference server's observed option 6 byte count (spec.md §4.1).
        options.domain_name_servers = Some(vec![self.dns_ip, Ipv4Addr::new(0, 0, 0, 0)]);

        Message {
            operation_code: OperationCode::BootReply,
            hardware_type: request.hardware_type,
            hardware_address_length: request.hardware_address_length,
            hops: request.hops,
            transaction_id: request.transaction_id,
            seconds: request.seconds,
            is_broadcast: request.is_broadcast,
            client_ip_address: request.client_ip_address,
            your_ip_address: yiaddr,
            server_ip_address: request.server_ip_address,
            gateway_ip_address: request.gateway_ip_address,
            client_hardware_address: request.client_hardware_address,
            server_name: request.server_name.clone(),
            boot_filename: request.boot_filename.clone(),
            options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dhcp_protocol::HardwareType;
    use eui48::MacAddress;

    fn builder() -> MessageBuilder {
        MessageBuilder::new(
            Ipv4Addr::new(192, 168, 1, 1),
            Ipv4Addr::new(255, 255, 255, 0),
            Ipv4Addr::new(192, 168, 1, 1),
            Ipv4Addr::new(192, 168, 1, 1),
            86400,
        )
    }

    fn discover() -> Message {
        let mut options = Options::default();
        options.message_type = Some(MessageType::Discover);
        Message {
            operation_code: OperationCode::BootRequest,
            hardware_type: HardwareType::Ethernet,
            hardware_address_length: 6,
            hops: 0,
            transaction_id: 0x1234,
            seconds: 0,
            is_broadcast: true,
            client_ip_address: Ipv4Addr::new(0, 0, 0, 0),
            your_ip_address: Ipv4Addr::new(0, 0, 0, 0),
            server_ip_address: Ipv4Addr::new(0, 0, 0, 0),
            gateway_ip_address: Ipv4Addr::new(0, 0, 0, 0),
            client_hardware_address: MacAddress::new([1, 2, 3, 4, 5, 6]),
            server_name: vec![0u8; 64],
            boot_filename: vec![0u8; 128],
            options,
        }
    }

    #[test]
    fn offer_carries_the_offered_address_and_lease_options() {
        let reply = builder().offer(&discover(), Ipv4Addr::new(192, 168, 1, 100));
        assert_eq!(reply.your_ip_address, Ipv4Addr::new(192, 168, 1, 100));
        assert_eq!(reply.options.message_type, Some(MessageType::Offer));
        assert_eq!(reply.options.lease_time, Some(86400));
        assert_eq!(reply.transaction_id, 0x1234);
    }

    #[test]
    fn offer_carries_two_dns_entries_with_a_trailing_zero() {
        let reply = builder().offer(&discover(), Ipv4Addr::new(192, 168, 1, 100));
        let servers = reply.options.domain_name_servers.expect("option 6 present");
        assert_eq!(servers, vec![Ipv4Addr::new(192, 168, 1, 1), Ipv4Addr::new(0, 0, 0, 0)]);
    }

    /// A relayed request carries header fields the builder must not
    /// overwrite: `hops`, `seconds`, `ciaddr` and `siaddr` all come from a
    /// relay agent or the client itself, not from this server's own config.
    fn relayed_request() -> Message {
        let mut request = discover();
        request.hops = 2;
        request.seconds = 17;
        request.client_ip_address = Ipv4Addr::new(192, 168, 1, 50);
        request.server_ip_address = Ipv4Addr::new(10, 9, 8, 7);
        request
    }

    #[test]
    fn offer_preserves_hops_seconds_ciaddr_and_siaddr_from_the_request() {
        let reply = builder().offer(&relayed_request(), Ipv4Addr::new(192, 168, 1, 100));
        assert_eq!(reply.hops, 2);
        assert_eq!(reply.seconds, 17);
        assert_eq!(reply.client_ip_address, Ipv4Addr::new(192, 168, 1, 50));
        assert_eq!(reply.server_ip_address, Ipv4Addr::new(10, 9, 8, 7));
    }

    #[test]
    fn nak_preserves_hops_seconds_ciaddr_and_siaddr_from_the_request() {
        let reply = builder().nak(&relayed_request());
        assert_eq!(reply.hops, 2);
        assert_eq!(reply.seconds, 17);
        assert_eq!(reply.client_ip_address, Ipv4Addr::new(192, 168, 1, 50));
        assert_eq!(reply.server_ip_address, Ipv4Addr::new(10, 9, 8, 7));
    }

    #[test]
    fn nak_carries_no_offered_address() {
        let reply = builder().nak(&discover());
        assert_eq!(reply.your_ip_address, Ipv4Addr::new(0, 0, 0, 0));
        assert_eq!(reply.options.message_type, Some(MessageType::Nak));
        assert_eq!(reply.options.message, Some("address not available".to_string()));
    }

    #[test]
    fn offer_and_nak_echo_the_requests_sname_and_file() {
        let mut request = discover();
        request.server_name[..4].copy_from_slice(b"boot");
        request.boot_filename[..7].copy_from_slice(b"pxeboot");

        let offer = builder().offer(&request, Ipv4Addr::new(192, 168, 1, 100));
        assert_eq!(offer.server_name, request.server_name);
        assert_eq!(offer.boot_filename, request.boot_filename);

        let nak = builder().nak(&request);
        assert_eq!(nak.server_name, request.server_name);
        assert_eq!(nak.boot_filename, request.boot_filename);
    }
}
