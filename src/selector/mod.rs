pub mod channel_selector;

pub use channel_selector::{ChannelSelector, ChannelSpec, WILDCARD};
