use anyhow::{Result, anyhow, bail};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::time::Duration;
use crate::core::{ProcessingNode, DataFrame};
use crate::nodes::{SineGenerator, StreamSink};
use crate::publisher::StreamPublisher;

/// Linear chain of nodes driven one block at a time
pub struct Pipeline {
    nodes: HashMap<String, Box<dyn ProcessingNode>>,
    execution_order: Vec<String>,
    publishers: HashMap<String, StreamPublisher>,
    blocks: u64,
}

impl Pipeline {
    pub async fn from_json(config: Value) -> Result<Self> {
        let mut nodes: HashMap<String, Box<dyn ProcessingNode>> = HashMap::new();
        let mut publishers = HashMap::new();
        let mut connections = Vec::new();

        // Parse nodes
        if let Some(nodes_array) = config["nodes"].as_array() {
            for node_config in nodes_array {
                let id = node_config["id"].as_str()
                    .ok_or(anyhow!("Node missing id"))?
                    .to_string();
                let node_type = node_config["type"].as_str()
                    .ok_or(anyhow!("Node missing type"))?;
                let node_cfg = node_config["config"].clone();

                let node: Box<dyn ProcessingNode> = match node_type {
                    "SineGenerator" => {
                        let mut node = SineGenerator::new();
                        node.on_create(node_cfg).await?;
                        Box::new(node)
                    }
                    "StreamSink" => {
                        let mut node = StreamSink::new();
                        node.on_create(node_cfg).await?;
                        if let Some(publisher) = node.publisher() {
                            publishers.insert(id.clone(), publisher);
                        }
                        Box::new(node)
                    }
                    _ => return Err(anyhow!("Unknown node type: {}", node_type)),
                };

                if nodes.insert(id.clone(), node).is_some() {
                    bail!("Duplicate node id: {}", id);
                }
            }
        }

        // Parse connections
        if let Some(conns_array) = config["connections"].as_array() {
            for conn in conns_array {
                let from = conn["from"].as_str()
                    .ok_or(anyhow!("Connection missing from"))?
                    .to_string();
                let to = conn["to"].as_str()
                    .ok_or(anyhow!("Connection missing to"))?
                    .to_string();
                connections.push((from, to));
            }
        }

        let execution_order = Self::execution_order(&nodes, &connections)?;

        Ok(Self { nodes, execution_order, publishers, blocks: 0 })
    }

    /// Source first, then follow connections
    fn execution_order(
        nodes: &HashMap<String, Box<dyn ProcessingNode>>,
        connections: &[(String, String)],
    ) -> Result<Vec<String>> {
        for (from, to) in connections {
            if !nodes.contains_key(from) || !nodes.contains_key(to) {
                bail!("Connection {} -> {} references an unknown node", from, to);
            }
        }

        let mut sources = nodes.keys()
            .filter(|id| !connections.iter().any(|(_, to)| to == *id));
        let source = match (sources.next(), sources.next()) {
            (Some(source), None) => source.clone(),
            (None, _) if nodes.is_empty() => return Ok(Vec::new()),
            (None, _) => bail!("Pipeline has no source node"),
            (Some(_), Some(_)) => bail!("Pipeline must be a single chain"),
        };

        let mut executed = HashSet::new();
        let mut order = vec![source.clone()];
        executed.insert(source);

        while let Some(last) = order.last() {
            let Some((_, next)) = connections.iter().find(|(from, _)| from == last) else {
                break;
            };
            if !executed.insert(next.clone()) {
                bail!("Pipeline contains a cycle at {}", next);
            }
            order.push(next.clone());
        }

        if order.len() != nodes.len() {
            bail!("Pipeline must be a single chain");
        }
        Ok(order)
    }

    /// Run one block through every node
    pub async fn execute_once(&mut self) -> Result<DataFrame> {
        let mut current_frame = DataFrame::new(0, self.blocks);
        self.blocks += 1;

        for node_id in &self.execution_order {
            if let Some(node) = self.nodes.get_mut(node_id) {
                current_frame = node.process(current_frame).await?;
            }
        }

        Ok(current_frame)
    }

    /// Run one block every `period` until `limit` blocks have run or
    /// `shutdown` completes. Returns the number of blocks run.
    pub async fn run_until<F: Future>(
        &mut self,
        period: Duration,
        limit: Option<u64>,
        shutdown: F,
    ) -> Result<u64> {
        let mut ticker = tokio::time::interval(period);
        tokio::pin!(shutdown);
        let mut ran = 0u64;

        while limit.map_or(true, |limit| ran < limit) {
            tokio::select! {
                _ = ticker.tick() => {
                    self.execute_once().await?;
                    ran += 1;
                }
                _ = &mut shutdown => {
                    log::info!("Shutdown requested after {} blocks", ran);
                    break;
                }
            }
        }

        Ok(ran)
    }

    /// Publisher handle of a `StreamSink` node, for control calls
    pub fn publisher(&self, node_id: &str) -> Option<StreamPublisher> {
        self.publishers.get(node_id).cloned()
    }

    /// Tear down every node, releasing sockets
    pub async fn shutdown(&mut self) -> Result<()> {
        for node_id in &self.execution_order {
            if let Some(node) = self.nodes.get_mut(node_id) {
                node.on_destroy().await?;
            }
        }
        Ok(())
    }
}
