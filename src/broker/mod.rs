//! The `broker` module models the resources the emulator exposes.
//!
//! Every resource is addressed by a fully-qualified path such as
//! `projects/demo/topics/orders`; [`ResourceName`] is the parsed form of that
//! path and is what the rest of the console passes around.

pub mod message;
pub mod resource;
pub mod topic;

pub use message::{PubsubMessage, ReceivedMessage};
pub use resource::{ResourceKind, ResourceName};
pub use topic::{Subscription, Topic};
