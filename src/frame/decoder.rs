use crate::error::{Error, Result};
use super::encoder::{FrameEncoder, FrameHeader};
use super::schema::ContinuousData;

/// A decoded frame, as seen by a subscriber
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub channel_count: u32,
    pub sample_count: u32,
    pub timestamp: u64,
    pub sequence_number: u64,
    pub sample_rate: u32,
    /// Channel-major: all samples of channel 0, then channel 1, ...
    pub samples: Vec<f32>,
}

impl Frame {
    /// Verify and decode a ContinuousData table.
    ///
    /// The payload length must equal `channel_count * sample_count`.
    pub fn decode(bytes: &[u8]) -> Result<Frame> {
        let table = ContinuousData::root(bytes).map_err(|e| Error::MalformedFrame(e.to_string()))?;

        let frame = Frame {
            channel_count: table.n_channels(),
            sample_count: table.n_samples(),
            timestamp: table.timestamp(),
            sequence_number: table.message_id(),
            sample_rate: table.sample_rate(),
            samples: table
                .samples()
                .map(|samples| samples.iter().collect())
                .unwrap_or_default(),
        };

        let expected = frame.channel_count as u64 * frame.sample_count as u64;
        if frame.samples.len() as u64 != expected {
            return Err(Error::MalformedFrame(format!(
                "{} samples for {} channels x {} samples",
                frame.samples.len(),
                frame.channel_count,
                frame.sample_count
            )));
        }

        Ok(frame)
    }

    /// Samples of one channel
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        if index >= self.channel_count as usize {
            return None;
        }
        let n = self.sample_count as usize;
        self.samples.get(index * n..(index + 1) * n)
    }

    /// Encode this frame into a fresh buffer
    pub fn encode(&self) -> Result<Vec<u8>> {
        let n = self.sample_count as usize;
        let channel_count = self.channel_count as usize;
        if self.samples.len() != channel_count * n {
            return Err(Error::InvalidBlock(format!(
                "{} samples for {} channels x {} samples",
                self.samples.len(),
                channel_count,
                n
            )));
        }

        let mut encoder = FrameEncoder::with_capacity(channel_count, n);
        let channels = (0..channel_count).map(|i| &self.samples[i * n..(i + 1) * n]);
        let header = FrameHeader {
            timestamp: self.timestamp,
            sequence_number: self.sequence_number,
            sample_rate: self.sample_rate,
        };
        Ok(encoder.encode(channels, n, header)?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flatbuffers::{FlatBufferBuilder, WIPOffset};

    #[test]
    fn test_older_writer_without_timestamp_or_rate() {
        let mut builder = FlatBufferBuilder::new();
        let samples = builder.create_vector(&[0.5f32, -1.0, 2.25, 3.0]);
        let table = builder.start_table();
        builder.push_slot_always::<WIPOffset<_>>(ContinuousData::VT_SAMPLES, samples);
        builder.push_slot::<u32>(ContinuousData::VT_N_CHANNELS, 2, 0);
        builder.push_slot::<u32>(ContinuousData::VT_N_SAMPLES, 2, 0);
        builder.push_slot::<u64>(ContinuousData::VT_MESSAGE_ID, 7, 0);
        let root = builder.end_table(table);
        builder.finish(root, None);

        let frame = Frame::decode(builder.finished_data()).unwrap();
        assert_eq!(frame.timestamp, 0);
        assert_eq!(frame.sample_rate, 0);
        assert_eq!(frame.sequence_number, 7);
        assert_eq!(frame.channel(1).unwrap(), &[2.25, 3.0]);
    }

    #[test]
    fn test_newer_writer_with_extra_field() {
        let mut builder = FlatBufferBuilder::new();
        let samples = builder.create_vector(&[1.0f32; 3]);
        let table = builder.start_table();
        builder.push_slot_always::<WIPOffset<_>>(ContinuousData::VT_SAMPLES, samples);
        builder.push_slot::<u32>(ContinuousData::VT_N_CHANNELS, 1, 0);
        builder.push_slot::<u32>(ContinuousData::VT_N_SAMPLES, 3, 0);
        builder.push_slot::<u32>(ContinuousData::VT_SAMPLE_RATE + 2, 99, 0);
        let root = builder.end_table(table);
        builder.finish(root, None);

        let frame = Frame::decode(builder.finished_data()).unwrap();
        assert_eq!(frame.samples, vec![1.0; 3]);
    }

    #[test]
    fn test_bad_root_offset() {
        let frame = Frame {
            channel_count: 1,
            sample_count: 2,
            timestamp: 1,
            sequence_number: 1,
            sample_rate: 1000,
            samples: vec![1.0, 2.0],
        };
        let mut bytes = frame.encode().unwrap();
        bytes[0..4].copy_from_slice(&10_000u32.to_le_bytes());
        assert!(matches!(Frame::decode(&bytes), Err(Error::MalformedFrame(_))));
    }
}
