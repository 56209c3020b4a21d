//! Real-time continuous-data publisher.
//!
//! Multi-channel sample blocks from an acquisition pipeline are narrowed to a
//! channel selection, framed as ContinuousData FlatBuffers tables and sent on
//! a ZeroMQ PUB socket, one frame per block.

pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod frame;
pub mod nodes;
pub mod observability;
pub mod publisher;
pub mod selector;
pub mod transport;

pub use config::PublisherConfig;
pub use core::{SampleBlock, SampleRateSource};
pub use error::{Error, ErrorKind, Result};
pub use frame::{Frame, FrameEncoder, FrameHeader};
pub use publisher::{BlockOutcome, StreamPublisher};
pub use selector::{ChannelSelector, ChannelSpec};
