//! The BOOTP/DHCP wire format: a typed `Message` plus decode/encode.
//!
//! Layout follows RFC 2131 §2 (the fixed 236-byte BOOTP header), RFC 2131
//! §3/§4.1 (options terminated by 0xFF), and RFC 2132 (the option tags used
//! here).

mod error;
mod message;
mod options;

pub use error::DecodeError;
pub use message::{HardwareType, Message, OperationCode, HEADER_LEN};
pub use options::{MessageType, OptionTag, Options};

/// The port a DHCP server listens on.
pub const DHCP_PORT_SERVER: u16 = 67;
/// The port a DHCP client listens on.
pub const DHCP_PORT_CLIENT: u16 = 68;

/// The 4-byte constant that separates the BOOTP header from DHCP options.
pub const MAGIC_COOKIE: u32 = 0x6382_5363;
