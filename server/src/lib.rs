//! Lease-assignment engine and UDP server loop.

mod builder;
mod destination;
mod engine;
mod lease;
mod server;

pub use engine::DhcpEngine;
pub use server::{bind, run, ServerError};
