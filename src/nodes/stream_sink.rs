use async_trait::async_trait;
use anyhow::Result;
use serde_json::Value;
use crate::config::PublisherConfig;
use crate::core::{ProcessingNode, DataFrame};
use crate::publisher::{BlockOutcome, StreamPublisher};

/// Pipeline sink that publishes every frame it receives.
///
/// Per-block publish failures are logged and the frame is passed through, so
/// a missing subscriber or a busy port never stops acquisition.
#[derive(Default)]
pub struct StreamSink {
    publisher: Option<StreamPublisher>,
}

impl StreamSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for control calls; `None` before `on_create`
    pub fn publisher(&self) -> Option<StreamPublisher> {
        self.publisher.clone()
    }
}

#[async_trait]
impl ProcessingNode for StreamSink {
    async fn on_create(&mut self, config: Value) -> Result<()> {
        let config = PublisherConfig::from_value(config)?;
        self.publisher = Some(StreamPublisher::new(&config)?);
        Ok(())
    }

    async fn process(&mut self, input: DataFrame) -> Result<DataFrame> {
        let Some(publisher) = &self.publisher else {
            anyhow::bail!("StreamSink used before on_create");
        };

        let block = input.as_block()?;
        match publisher.on_block(&block).await {
            Ok(BlockOutcome::Published { sequence, .. }) => {
                log::debug!("Frame #{} published as message {}", input.sequence_id, sequence);
            }
            Ok(BlockOutcome::Empty) => {}
            Ok(BlockOutcome::Dropped { .. }) => {}
            Err(err) => log::warn!("Frame #{} not published: {}", input.sequence_id, err),
        }

        Ok(input)
    }

    async fn on_destroy(&mut self) -> Result<()> {
        if let Some(publisher) = self.publisher.take() {
            publisher.shutdown().await;
        }
        Ok(())
    }
}
