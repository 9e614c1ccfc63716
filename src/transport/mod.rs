//! The `transport` module is responsible for talking to the broker over
//! HTTP.
//!
//! It defines the JSON bodies exchanged with the emulator's REST surface and
//! a small transport that sends them, decodes replies and turns non-2xx
//! answers into broker errors carrying the broker's own message.

pub mod http;
pub mod message;

pub use http::HttpTransport;
