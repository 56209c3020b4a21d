use super::DataFrame;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Base trait for all processing nodes in the pipeline
#[async_trait]
pub trait ProcessingNode: Send + Sync {
    /// Called once when node is instantiated with config from JSON
    async fn on_create(&mut self, config: Value) -> Result<()>;

    /// Called once per block, in pipeline order
    async fn process(&mut self, input: DataFrame) -> Result<DataFrame>;

    /// Called once when the pipeline is torn down; releases external resources
    async fn on_destroy(&mut self) -> Result<()> {
        Ok(())
    }
}
