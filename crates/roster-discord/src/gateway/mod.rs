//! Discord gateway (v10, JSON encoding) client.

pub mod opcodes;
pub mod payloads;
pub mod session;

pub use opcodes::OpCode;
pub use payloads::{GatewayMessage, HelloPayload, IdentifyPayload, Intents};
pub use session::{run_gateway, run_session, GatewayEvent, SessionEnd, SessionState, Step};
