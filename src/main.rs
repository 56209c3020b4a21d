use anyhow::Result;
use clap::Parser;
use falcon_output::engine::Pipeline;
use falcon_output::publisher::ControlCommand;
use falcon_output::PublisherConfig;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Publish synthetic multi-channel data as ContinuousData frames over ZeroMQ.
///
/// While running, stdin accepts `port <n>`, `channels <list>` and `status`.
#[derive(Parser, Debug)]
#[command(name = "falcon-output", version)]
struct Args {
    /// JSON publisher config (port, channels, fallback_sample_rate)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Data port, overrides the config file
    #[arg(short, long)]
    port: Option<u16>,

    /// Channel list such as "0,2,3" or "*", overrides the config file
    #[arg(long)]
    channels: Option<String>,

    /// Channels produced by the generator
    #[arg(long, default_value_t = 8)]
    source_channels: usize,

    /// Samples per block
    #[arg(long, default_value_t = 1024)]
    block_size: usize,

    #[arg(long, default_value_t = 30000.0)]
    sample_rate: f64,

    /// Stop after this many blocks (runs until Ctrl-C when omitted)
    #[arg(long)]
    blocks: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => PublisherConfig::from_file(path)?,
        None => PublisherConfig::default(),
    };
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(channels) = args.channels.clone() {
        config.channels = channels;
    }

    let pipeline_config = serde_json::json!({
        "nodes": [
            {
                "id": "source",
                "type": "SineGenerator",
                "config": {
                    "frequency": 10.0,
                    "sample_rate": args.sample_rate,
                    "frame_size": args.block_size,
                    "channels": args.source_channels
                }
            },
            {
                "id": "falcon_output",
                "type": "StreamSink",
                "config": serde_json::to_value(&config)?
            }
        ],
        "connections": [
            {"from": "source", "to": "falcon_output"}
        ]
    });

    let mut pipeline = Pipeline::from_json(pipeline_config).await?;
    if let Some(publisher) = pipeline.publisher("falcon_output") {
        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if line.trim().is_empty() {
                    continue;
                }
                let result = match ControlCommand::parse(&line) {
                    Ok(command) => command.apply(&publisher).await,
                    Err(err) => Err(err),
                };
                match result {
                    Ok(message) => log::info!("{}", message),
                    Err(err) => log::warn!("{}", err),
                }
            }
        });
    }

    log::info!(
        "Publishing {} channels x {} samples at {} Hz on port {} (channels {:?})",
        args.source_channels,
        args.block_size,
        args.sample_rate,
        config.port,
        config.channels
    );

    // interval() rejects a zero period, which a zero block size would give
    let block_period = Duration::from_secs_f64(args.block_size as f64 / args.sample_rate)
        .max(Duration::from_millis(1));
    let sent = pipeline
        .run_until(block_period, args.blocks, tokio::signal::ctrl_c())
        .await?;

    pipeline.shutdown().await?;
    log::info!("Published {} blocks", sent);
    Ok(())
}
