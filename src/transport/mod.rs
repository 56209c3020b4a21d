//! Pub/sub transport for encoded frames

pub mod endpoint;

pub use endpoint::{bind_address, BoundSocket, PublishEndpoint};
