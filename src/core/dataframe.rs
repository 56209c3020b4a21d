use std::collections::HashMap;
use serde::{Serialize, Deserialize};
use crate::core::SampleBlock;
use crate::error::Result;

/// Basic data unit passed between processing nodes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataFrame {
    /// Sample-clock tick of the first sample
    pub timestamp: u64,

    /// Sequential frame number for ordering
    pub sequence_id: u64,

    /// Planar samples, channel-major: all of channel 0, then channel 1, ...
    pub samples: Vec<f32>,

    pub n_channels: usize,

    /// Samples per channel
    pub n_samples: usize,

    /// Declared rate of the first channel, if known
    pub sample_rate: Option<f32>,

    /// Side-channel information (source, frequency, etc)
    pub metadata: HashMap<String, String>,
}

impl DataFrame {
    pub fn new(timestamp: u64, sequence_id: u64) -> Self {
        Self {
            timestamp,
            sequence_id,
            samples: Vec::new(),
            n_channels: 0,
            n_samples: 0,
            sample_rate: None,
            metadata: HashMap::new(),
        }
    }

    /// Replace the payload with `channels`, all of which must be the same length
    pub fn set_channels(&mut self, channels: &[Vec<f32>]) {
        let n_samples = channels.first().map(|c| c.len()).unwrap_or(0);
        self.samples.clear();
        for channel in channels {
            debug_assert_eq!(channel.len(), n_samples);
            self.samples.extend_from_slice(channel);
        }
        self.n_channels = channels.len();
        self.n_samples = n_samples;
    }

    /// Borrow the payload as a block for the publisher
    pub fn as_block(&self) -> Result<SampleBlock<'_>> {
        let block = SampleBlock::new(&self.samples, self.n_channels, self.n_samples, self.timestamp)?;
        Ok(match self.sample_rate {
            Some(rate) => block.with_sample_rate(rate),
            None => block,
        })
    }
}
