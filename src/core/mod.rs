pub mod block;
pub mod dataframe;
pub mod node;

pub use block::{FixedSampleRate, SampleBlock, SampleRateSource};
pub use dataframe::DataFrame;
pub use node::ProcessingNode;
