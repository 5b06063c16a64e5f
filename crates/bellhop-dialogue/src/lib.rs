//! Session-driven dialogue engine for the Bellhop CI concierge.
//!
//! One inbound chat event is one evaluation pass: extract the triggering
//! input, load the sender's persisted dialogue position, run the step's
//! transition, call out to CI and chat delivery as the transition demands,
//! persist the next position, and report a terminal status tag. Evaluation
//! never errors; every internal fault is contained per event.

mod dialogue_runtime;

pub use dialogue_runtime::{
    extract_inbound_message, DialogueRuntime, DialogueRuntimeConfig, DialogueStatus,
    InboundMessage,
};
