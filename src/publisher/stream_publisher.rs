//! Per-block orchestration: select channels, frame, publish
//!
//! All publisher state (port, channel selection, socket, encoder, sequence
//! counter) lives behind one async mutex. `on_block` holds it for the whole
//! call, so control calls made while a block is in flight take effect on the
//! next block and a frame never mixes two channel selections.

use crate::config::PublisherConfig;
use crate::core::{FixedSampleRate, SampleBlock, SampleRateSource};
use crate::error::{Error, Result};
use crate::frame::{FrameEncoder, FrameHeader};
use crate::observability::PublisherMetrics;
use crate::selector::ChannelSelector;
use crate::transport::PublishEndpoint;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

/// What `on_block` did with a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockOutcome {
    /// One frame was handed to the transport
    Published {
        sequence: u64,
        channel_count: usize,
        bytes: usize,
    },
    /// Block had no samples; nothing sent, sequence unchanged
    Empty,
    /// A selected channel is missing from the block; nothing sent, sequence unchanged
    Dropped { channel: usize, available: usize },
}

/// Current configuration and counters, for status reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublisherStatus {
    pub port: u16,
    pub local_port: Option<u16>,
    pub channels: String,
    pub sequence_number: u64,
}

struct PublisherState {
    port: u16,
    /// Port whose bind failed; not retried until the port is set again
    failed_port: Option<u16>,
    selector: ChannelSelector,
    endpoint: PublishEndpoint,
    /// Owns the FlatBuffers builder, reset per block
    encoder: FrameEncoder,
    /// Resolved channel indices, reused across blocks
    indices: Vec<usize>,
    sequence: u64,
    warned_out_of_range: bool,
}

/// Publishes one frame per non-empty block on a PUB socket.
///
/// Cloning yields another handle to the same publisher, which is how a
/// control path reaches a publisher driven by the processing loop.
#[derive(Clone)]
pub struct StreamPublisher {
    state: Arc<Mutex<PublisherState>>,
    sample_rate: Arc<dyn SampleRateSource>,
    metrics: Arc<PublisherMetrics>,
}

impl StreamPublisher {
    /// Create an unbound publisher; the socket is opened by the first block
    pub fn new(config: &PublisherConfig) -> Result<Self> {
        let selector = ChannelSelector::new(&config.channels)?;
        Ok(Self {
            state: Arc::new(Mutex::new(PublisherState {
                port: config.port,
                failed_port: None,
                selector,
                endpoint: PublishEndpoint::new(),
                encoder: FrameEncoder::new(),
                indices: Vec::new(),
                sequence: 0,
                warned_out_of_range: false,
            })),
            sample_rate: Arc::new(FixedSampleRate(config.fallback_sample_rate)),
            metrics: Arc::new(PublisherMetrics::new()),
        })
    }

    /// Use `source` for blocks that carry no sample rate of their own
    pub fn with_sample_rate_source(mut self, source: Arc<dyn SampleRateSource>) -> Self {
        self.sample_rate = source;
        self
    }

    /// Publish `block` as one frame.
    ///
    /// Binds the socket first if needed, even for empty blocks. The sequence
    /// number is consumed as soon as a frame is built, so a failed send still
    /// leaves a gap that subscribers can see.
    pub async fn on_block(&self, block: &SampleBlock<'_>) -> Result<BlockOutcome> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        let port = state.port;
        if state.failed_port == Some(port) {
            return Err(Error::PortUnavailable(port));
        }
        let socket = match state.endpoint.ensure_bound(port).await {
            Ok(socket) => socket,
            Err(err) => {
                log::error!("{}", err);
                state.failed_port = Some(port);
                self.metrics.record_bind_error();
                return Err(err);
            }
        };

        if block.is_empty() {
            self.metrics.record_empty_block();
            return Ok(BlockOutcome::Empty);
        }

        match state.selector.resolve_into(block.n_channels(), &mut state.indices) {
            Ok(()) => {}
            Err(Error::ChannelOutOfRange { channel, available }) => {
                if !state.warned_out_of_range {
                    log::warn!(
                        "Channel {} not in block with {} channels, dropping blocks until the selection fits",
                        channel,
                        available
                    );
                    state.warned_out_of_range = true;
                }
                self.metrics.record_dropped_block();
                return Ok(BlockOutcome::Dropped { channel, available });
            }
            Err(err) => return Err(err),
        }
        if state.warned_out_of_range {
            log::info!("Channel selection fits the block again, resuming");
            state.warned_out_of_range = false;
        }

        state.sequence += 1;
        let sequence = state.sequence;

        let start = self.metrics.start_processing();
        let sample_rate = block
            .sample_rate
            .unwrap_or_else(|| self.sample_rate.sample_rate());
        let header = FrameHeader {
            timestamp: block.timestamp,
            sequence_number: sequence,
            // Float rates truncate toward zero; NaN and negatives become 0
            sample_rate: sample_rate as u32,
        };
        let channels = state
            .indices
            .iter()
            .map(|&ch| block.channel(ch).unwrap_or_default());
        let bytes = state.encoder.encode(channels, block.n_samples(), header)?;
        let len = bytes.len();

        if let Err(err) = socket.publish(bytes, sequence).await {
            log::warn!("{}", err);
            self.metrics.record_send_error();
            return Err(err);
        }
        self.metrics.finish_processing(start);
        self.metrics.record_published(len);
        log::trace!(
            "Sent frame {} ({} channels x {} samples, {} bytes)",
            sequence,
            state.indices.len(),
            block.n_samples(),
            len
        );

        Ok(BlockOutcome::Published {
            sequence,
            channel_count: state.indices.len(),
            bytes: len,
        })
    }

    /// Replace the channel selection; on error the previous one stays in effect
    pub async fn set_channels(&self, text: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        state.selector.set_spec(text)?;
        state.warned_out_of_range = false;
        log::info!("Channel selection updated: {:?}", text);
        Ok(())
    }

    /// Change the data port.
    ///
    /// An unbound publisher just records the port for the next block. A bound
    /// one rebinds immediately; if the new port cannot be bound, the previous
    /// port is kept and rebound, and the bind error is returned.
    pub async fn set_port(&self, port: u16) -> Result<()> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        if state.endpoint.is_bound() && port != state.port {
            let previous = state.port;
            if let Err(err) = state.endpoint.ensure_bound(port).await.map(|_| ()) {
                self.metrics.record_bind_error();
                log::warn!("{}, keeping port {}", err, previous);
                if let Err(restore) = state.endpoint.ensure_bound(previous).await.map(|_| ()) {
                    log::error!("Couldn't restore data socket: {}", restore);
                }
                return Err(err);
            }
        }

        state.port = port;
        state.failed_port = None;
        log::info!("Data port updated to {}", port);
        Ok(())
    }

    /// Parse and apply a port typed by a user
    pub async fn set_port_text(&self, text: &str) -> Result<()> {
        let port = parse_port(text)?;
        self.set_port(port).await
    }

    /// Close the socket. A later block binds again.
    pub async fn shutdown(&self) {
        let mut state = self.state.lock().await;
        state.endpoint.close().await;
    }

    pub async fn status(&self) -> PublisherStatus {
        let state = self.state.lock().await;
        PublisherStatus {
            port: state.port,
            local_port: state.endpoint.local_port(),
            channels: state.selector.text().to_string(),
            sequence_number: state.sequence,
        }
    }

    /// Last sequence number used; 0 before the first frame
    pub async fn sequence_number(&self) -> u64 {
        self.state.lock().await.sequence
    }

    /// Listening port, if bound
    pub async fn local_port(&self) -> Option<u16> {
        self.state.lock().await.endpoint.local_port()
    }

    /// Number of socket binds performed so far
    pub async fn bind_count(&self) -> u64 {
        self.state.lock().await.endpoint.bind_count()
    }

    pub fn metrics(&self) -> Arc<PublisherMetrics> {
        self.metrics.clone()
    }
}

/// Parse a data port typed by a user
pub fn parse_port(text: &str) -> Result<u16> {
    text.trim()
        .parse::<u16>()
        .map_err(|_| Error::InvalidPort(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_port() {
        assert_eq!(parse_port("5555").unwrap(), 5555);
        assert_eq!(parse_port(" 0 ").unwrap(), 0);
        assert!(parse_port("abc").is_err());
        assert!(parse_port("-1").is_err());
        assert!(parse_port("70000").is_err());
        assert!(parse_port("").is_err());
    }

    #[tokio::test]
    async fn test_failed_send_consumes_sequence_number() {
        use crate::error::ErrorKind;
        use crate::frame::Frame;
        use tokio::time::{sleep, timeout, Duration};
        use zeromq::{Socket, SocketRecv, SubSocket};

        let config = PublisherConfig {
            port: 0,
            ..Default::default()
        };
        let publisher = StreamPublisher::new(&config).unwrap();

        let empty = SampleBlock::new(&[], 1, 0, 0).unwrap();
        publisher.on_block(&empty).await.unwrap();
        let port = publisher.local_port().await.unwrap();
        let mut subscriber = SubSocket::new();
        subscriber
            .connect(&format!("tcp://127.0.0.1:{}", port))
            .await
            .unwrap();
        subscriber.subscribe("").await.unwrap();
        sleep(Duration::from_millis(300)).await;

        let data = vec![0.5f32; 8];
        let block = SampleBlock::new(&data, 2, 4, 0).unwrap();

        let first = publisher.on_block(&block).await.unwrap();
        assert!(matches!(first, BlockOutcome::Published { sequence: 1, .. }));

        publisher.state.lock().await.endpoint.fail_next_send();
        let err = publisher.on_block(&block).await.unwrap_err();
        assert!(matches!(err, Error::Send { sequence: 2, .. }));
        assert_eq!(err.kind(), ErrorKind::Transport);

        let third = publisher.on_block(&block).await.unwrap();
        assert!(matches!(third, BlockOutcome::Published { sequence: 3, .. }));
        assert_eq!(publisher.sequence_number().await, 3);

        let mut received = Vec::new();
        for _ in 0..2 {
            let message = timeout(Duration::from_secs(5), subscriber.recv())
                .await
                .expect("frame within 5s")
                .unwrap();
            let frame = Frame::decode(message.get(0).unwrap()).unwrap();
            received.push(frame.sequence_number);
        }
        assert_eq!(received, vec![1, 3]);

        let metrics = publisher.metrics().snapshot();
        assert_eq!(metrics.send_errors, 1);
        assert_eq!(metrics.frames_published, 2);

        publisher.shutdown().await;
    }
}
