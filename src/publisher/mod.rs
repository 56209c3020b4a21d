pub mod control;
pub mod stream_publisher;

pub use control::ControlCommand;
pub use stream_publisher::{parse_port, BlockOutcome, PublisherStatus, StreamPublisher};
