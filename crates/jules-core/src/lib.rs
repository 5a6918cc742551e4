//! Client core for the Jules REST API: a retrying request engine, a state
//! poller and typed operations on sources, sessions and activities.

pub mod api;
pub mod config;
pub mod engine;
pub mod logging;
pub mod normalize;
pub mod poller;
pub mod redact;
pub mod retry;
pub mod time;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use api::JulesClient;
pub use config::ClientConfig;
pub use engine::{Operation, RequestEngine};
pub use poller::{await_state, PollOutcome, TargetStates};
pub use retry::{ApiError, ErrorKind};
