use crate::error::{Error, Result};

/// One processing callback's worth of samples, borrowed from the caller.
///
/// Samples are planar: channel `i` occupies `data[i * stride..i * stride + n_samples]`.
/// The stride may exceed `n_samples` when the acquisition buffer is allocated
/// larger than the samples actually written this callback.
#[derive(Debug, Clone, Copy)]
pub struct SampleBlock<'a> {
    data: &'a [f32],
    n_channels: usize,
    n_samples: usize,
    stride: usize,
    /// Sample-clock tick of the first sample
    pub timestamp: u64,
    /// Rate declared by the first channel, if the pipeline has channel metadata
    pub sample_rate: Option<f32>,
}

impl<'a> SampleBlock<'a> {
    /// Tightly packed block (`stride == n_samples`)
    pub fn new(data: &'a [f32], n_channels: usize, n_samples: usize, timestamp: u64) -> Result<Self> {
        Self::with_stride(data, n_channels, n_samples, n_samples, timestamp)
    }

    pub fn with_stride(
        data: &'a [f32],
        n_channels: usize,
        n_samples: usize,
        stride: usize,
        timestamp: u64,
    ) -> Result<Self> {
        if n_samples > stride {
            return Err(Error::InvalidBlock(format!(
                "{} samples do not fit a stride of {}",
                n_samples, stride
            )));
        }
        let needed = n_channels
            .checked_mul(stride)
            .ok_or_else(|| Error::InvalidBlock("block size overflows".to_string()))?;
        if data.len() < needed {
            return Err(Error::InvalidBlock(format!(
                "{} channels x {} stride needs {} samples, got {}",
                n_channels,
                stride,
                needed,
                data.len()
            )));
        }

        Ok(Self {
            data,
            n_channels,
            n_samples,
            stride,
            timestamp,
            sample_rate: None,
        })
    }

    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = Some(sample_rate);
        self
    }

    pub fn n_channels(&self) -> usize {
        self.n_channels
    }

    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    pub fn is_empty(&self) -> bool {
        self.n_samples == 0
    }

    /// The `n_samples` valid samples of channel `index`
    pub fn channel(&self, index: usize) -> Option<&'a [f32]> {
        if index >= self.n_channels {
            return None;
        }
        let start = index * self.stride;
        self.data.get(start..start + self.n_samples)
    }
}

/// Fallback sample rate for blocks without channel metadata
pub trait SampleRateSource: Send + Sync {
    fn sample_rate(&self) -> f32;
}

/// Constant fallback rate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedSampleRate(pub f32);

impl SampleRateSource for FixedSampleRate {
    fn sample_rate(&self) -> f32 {
        self.0
    }
}

impl Default for FixedSampleRate {
    fn default() -> Self {
        Self(30000.0)
    }
}
