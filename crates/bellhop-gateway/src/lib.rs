//! HTTP webhook gateway in front of the Bellhop dialogue runtime.
//!
//! Handles the chat platform's subscription verification handshake and hands
//! parsed event bodies to the dialogue engine. Deliberately thin: every
//! decision beyond token verification and JSON parsing lives in the engine.

mod gateway_server;

pub use gateway_server::{run_gateway, GatewayConfig};
