//! Host-facing command contract, router and stdio bridge.

pub mod channel;
pub mod contract;
pub mod stdio;

pub use channel::{HostCommandClient, HostCommandServer, command_channel};
pub use contract::{CommandEnvelope, CommandName, EventEnvelope, ResponseEnvelope};
pub use stdio::{run_bridge, run_stdio_bridge};
