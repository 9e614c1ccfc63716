//! # pubsub-console
//!
//! `pubsub-console` is an administrative console for a Pub/Sub emulator's
//! REST surface: manage topics and subscriptions of a project, publish
//! messages, pull them and acknowledge them. All durable state lives in the
//! emulator; the console only keeps what it displays.
//!
//! ## Core Modules
//!
//! The library is structured into several modules, each with a distinct responsibility:
//!
//! - `broker`: Resource names and the topic, subscription and message types the emulator exposes.
//! - `transport`: JSON wire bodies and the HTTP transport that carries them.
//! - `client`: The broker client, one async operation per broker capability.
//! - `console`: View state, refresh sequencing, and the publish and pull panels.
//! - `shell`: The interactive line-based session driving the console.
//! - `config`: Handles loading and merging console configuration.
//! - `utils`: Shared error type and logging setup.

pub mod broker;
pub mod client;
pub mod config;
pub mod console;
pub mod shell;
pub mod transport;
pub mod utils;

#[cfg(test)]
mod tests;
