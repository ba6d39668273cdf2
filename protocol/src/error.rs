//! Decode failures. A bad incoming frame is always dropped by the caller,
//! never unwrapped, so every variant carries enough detail for the log line
//! spec'd for input-drop errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("packet is {len} bytes, shorter than the 240-byte BOOTP header")]
    Truncated { len: usize },
    #[error("magic cookie {found:#010x} does not match 0x63825363")]
    BadMagicCookie { found: u32 },
    #[error("options section has no 0xFF end marker")]
    MissingEndOption,
    #[error("option {tag} at offset {offset} claims length {len} past the end of the packet")]
    OptionOverrun { tag: u8, offset: usize, len: usize },
}
