//! DNS forwarding engine and UDP server loop.

mod engine;
mod inflight;
mod server;

pub use engine::{ClientAction, ForwarderEngine};
pub use server::{bind_client_socket, bind_upstream_socket, run, ServerError};
