use anyhow::{anyhow, Result};
use clap::Parser;
use falcon_output::Frame;
use zeromq::{Socket, SocketRecv, SubSocket};

/// Subscribe to a falcon-output publisher and log every decoded frame.
#[derive(Parser, Debug)]
#[command(name = "falcon-listen", version)]
struct Args {
    /// Publisher endpoint
    #[arg(short, long, default_value = "tcp://127.0.0.1:3335")]
    endpoint: String,

    /// Stop after this many frames
    #[arg(long)]
    frames: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut socket = SubSocket::new();
    socket
        .connect(&args.endpoint)
        .await
        .map_err(|e| anyhow!("ZMQ SUB connect error: {}", e))?;
    socket
        .subscribe("")
        .await
        .map_err(|e| anyhow!("ZMQ subscribe error: {}", e))?;
    log::info!("Subscribed to {}", args.endpoint);

    let mut received = 0u64;
    let mut last_sequence: Option<u64> = None;

    loop {
        let message = socket
            .recv()
            .await
            .map_err(|e| anyhow!("ZMQ receive error: {}", e))?;
        let Some(bytes) = message.get(0) else {
            log::warn!("Empty message");
            continue;
        };

        let frame = match Frame::decode(bytes) {
            Ok(frame) => frame,
            Err(err) => {
                log::warn!("{}", err);
                continue;
            }
        };

        if let Some(last) = last_sequence {
            if frame.sequence_number != last + 1 {
                log::warn!(
                    "Sequence gap: {} -> {} ({} frames missed)",
                    last,
                    frame.sequence_number,
                    frame.sequence_number.saturating_sub(last + 1)
                );
            }
        }
        last_sequence = Some(frame.sequence_number);

        let first = frame.channel(0).map(rms).unwrap_or(0.0);
        log::info!(
            "Frame {} @ {}: {} channels x {} samples, {} Hz, ch0 rms={:.4}",
            frame.sequence_number,
            frame.timestamp,
            frame.channel_count,
            frame.sample_count,
            frame.sample_rate,
            first
        );

        received += 1;
        if args.frames.is_some_and(|limit| received >= limit) {
            break;
        }
    }

    socket.close().await;
    Ok(())
}

fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    (samples.iter().map(|x| x * x).sum::<f32>() / samples.len() as f32).sqrt()
}
