use flatbuffers::{FlatBufferBuilder, WIPOffset};
use crate::error::{Error, Result};
use super::schema::ContinuousData;

/// Builder size for a fresh encoder; grows with the first large frame
const INITIAL_CAPACITY: usize = 1024;

/// Table, vtable and root offset on top of the sample bytes
const TABLE_OVERHEAD: usize = 64;

/// Per-frame scalars chosen by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameHeader {
    /// Sample-clock tick of the first sample
    pub timestamp: u64,
    pub sequence_number: u64,
    pub sample_rate: u32,
}

/// Builds frames with one FlatBuffers builder that is reset, not reallocated,
/// between calls
pub struct FrameEncoder {
    builder: FlatBufferBuilder<'static>,
    /// Selected channels laid out back to back
    samples: Vec<f32>,
}

impl Default for FrameEncoder {
    fn default() -> Self {
        Self {
            builder: FlatBufferBuilder::with_capacity(INITIAL_CAPACITY),
            samples: Vec::new(),
        }
    }
}

impl FrameEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-size the buffers for frames of up to `channels x samples`
    pub fn with_capacity(channels: usize, samples: usize) -> Self {
        let values = channels.checked_mul(samples).unwrap_or(0);
        let bytes = values
            .checked_mul(4)
            .and_then(|b| b.checked_add(TABLE_OVERHEAD))
            .unwrap_or(INITIAL_CAPACITY);
        Self {
            builder: FlatBufferBuilder::with_capacity(bytes),
            samples: Vec::with_capacity(values),
        }
    }

    /// Encode one frame from the selected channels, in the order given.
    ///
    /// Every channel must hold at least `n_samples` values; only the first
    /// `n_samples` are copied. The returned slice is valid until the next call.
    pub fn encode<'s, I>(&mut self, channels: I, n_samples: usize, header: FrameHeader) -> Result<&[u8]>
    where
        I: IntoIterator<Item = &'s [f32]>,
        I::IntoIter: ExactSizeIterator,
    {
        let channels = channels.into_iter();
        let n_channels = channels.len();

        let channel_count = u32::try_from(n_channels)
            .map_err(|_| Error::InvalidBlock(format!("{} channels exceed frame limit", n_channels)))?;
        let sample_count = u32::try_from(n_samples)
            .map_err(|_| Error::InvalidBlock(format!("{} samples exceed frame limit", n_samples)))?;
        // Vector lengths are u32 on the wire
        n_channels
            .checked_mul(n_samples)
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| Error::InvalidBlock("frame payload too large".to_string()))?;

        self.samples.clear();
        for (index, channel) in channels.enumerate() {
            let src = channel.get(..n_samples).ok_or_else(|| {
                Error::InvalidBlock(format!(
                    "channel {} holds {} samples, expected {}",
                    index,
                    channel.len(),
                    n_samples
                ))
            })?;
            self.samples.extend_from_slice(src);
        }

        self.builder.reset();
        let samples = self.builder.create_vector(&self.samples);

        let table = self.builder.start_table();
        self.builder
            .push_slot::<u64>(ContinuousData::VT_TIMESTAMP, header.timestamp, 0);
        self.builder
            .push_slot::<u64>(ContinuousData::VT_MESSAGE_ID, header.sequence_number, 0);
        self.builder
            .push_slot_always::<WIPOffset<_>>(ContinuousData::VT_SAMPLES, samples);
        self.builder
            .push_slot::<u32>(ContinuousData::VT_N_CHANNELS, channel_count, 0);
        self.builder
            .push_slot::<u32>(ContinuousData::VT_N_SAMPLES, sample_count, 0);
        self.builder
            .push_slot::<u32>(ContinuousData::VT_SAMPLE_RATE, header.sample_rate, 0);
        let root = self.builder.end_table(table);
        self.builder.finish(root, None);

        Ok(self.builder.finished_data())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_verifies_as_continuous_data() {
        let a = [1.0f32; 10];
        let b = [2.0f32; 10];
        let mut encoder = FrameEncoder::new();
        let header = FrameHeader {
            timestamp: 5,
            sequence_number: 9,
            sample_rate: 30_000,
        };
        let bytes = encoder.encode([&a[..], &b[..]], 10, header).unwrap();

        let table = ContinuousData::root(bytes).unwrap();
        assert_eq!(table.n_channels(), 2);
        assert_eq!(table.n_samples(), 10);
        assert_eq!(table.message_id(), 9);
        let samples = table.samples().unwrap();
        assert_eq!(samples.len(), 20);
        assert_eq!(samples.get(10), 2.0);
    }

    #[test]
    fn test_failed_encode_does_not_poison_builder() {
        let a = [1.0f32; 4];
        let mut encoder = FrameEncoder::new();
        assert!(encoder.encode([&a[..]], 8, FrameHeader::default()).is_err());

        let bytes = encoder.encode([&a[..]], 4, FrameHeader::default()).unwrap();
        assert_eq!(ContinuousData::root(bytes).unwrap().n_samples(), 4);
    }
}
