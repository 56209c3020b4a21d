//! ContinuousData frame codec
//!
//! Each block is published as one FlatBuffers table so that existing
//! subscribers can read it with their generated `ContinuousData` accessors:
//!
//! ```text
//! table ContinuousData {
//!   samples: [float];     // channel-major
//!   n_channels: uint32;
//!   n_samples: uint32;
//!   timestamp: uint64;
//!   message_id: uint64;   // sequence number
//!   sample_rate: uint32;
//! }
//! ```
//!
//! Fields equal to their default (0) are left out of the table by the
//! builder and read back as 0. Frames from writers with fewer or extra
//! fields decode as well.

pub mod decoder;
pub mod encoder;
pub mod schema;

pub use decoder::Frame;
pub use encoder::{FrameEncoder, FrameHeader};
pub use schema::ContinuousData;
