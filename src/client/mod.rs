//! The `client` module adapts console actions to the broker's REST surface.
//!
//! [`BrokerClient`] exposes one async operation per broker capability. Each
//! operation is a single request/response pair: nothing is batched, queued
//! or retried locally.

pub mod payload;
pub mod pubsub_client;

pub use payload::{Payload, decode_data};
pub use pubsub_client::{BrokerClient, DEFAULT_ACK_DEADLINE_SECONDS, DEFAULT_MAX_MESSAGES};

#[cfg(test)]
mod tests;
