pub mod sine_generator;
pub mod stream_sink;

pub use sine_generator::SineGenerator;
pub use stream_sink::StreamSink;
