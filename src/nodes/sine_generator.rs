use async_trait::async_trait;
use anyhow::{bail, Result};
use serde_json::Value;
use std::f64::consts::PI;
use crate::core::{ProcessingNode, DataFrame};

/// Multi-channel test source; channel `i` runs at `frequency * (i + 1)`
pub struct SineGenerator {
    frequency: f64,
    sample_rate: f64,
    frame_size: usize,
    channels: usize,
    amplitude: f64,
    phase: f64,  // Phase of the fundamental, carried across blocks
    ticks: u64,
}

impl Default for SineGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SineGenerator {
    pub fn new() -> Self {
        Self {
            frequency: 10.0,
            sample_rate: 30000.0,
            frame_size: 1024,
            channels: 4,
            amplitude: 1.0,
            phase: 0.0,
            ticks: 0,
        }
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }
}

#[async_trait]
impl ProcessingNode for SineGenerator {
    async fn on_create(&mut self, config: Value) -> Result<()> {
        if let Some(freq) = config["frequency"].as_f64() {
            self.frequency = freq;
        }
        if let Some(sr) = config["sample_rate"].as_f64() {
            self.sample_rate = sr;
        }
        if let Some(size) = config["frame_size"].as_u64() {
            self.frame_size = size as usize;
        }
        if let Some(channels) = config["channels"].as_u64() {
            self.channels = channels as usize;
        }
        if let Some(amp) = config["amplitude"].as_f64() {
            self.amplitude = amp;
        }
        if self.sample_rate <= 0.0 {
            bail!("sample_rate must be positive, got {}", self.sample_rate);
        }
        Ok(())
    }

    async fn process(&mut self, mut input: DataFrame) -> Result<DataFrame> {
        let phase_increment = 2.0 * PI * self.frequency / self.sample_rate;

        input.samples.clear();
        input.samples.reserve(self.channels * self.frame_size);
        for ch in 0..self.channels {
            let harmonic = (ch + 1) as f64;
            for i in 0..self.frame_size {
                let phase = self.phase + (i as f64) * phase_increment;
                input.samples.push((self.amplitude * (harmonic * phase).sin()) as f32);
            }
        }

        self.phase = (self.phase + self.frame_size as f64 * phase_increment) % (2.0 * PI);

        input.n_channels = self.channels;
        input.n_samples = self.frame_size;
        input.timestamp = self.ticks;
        input.sample_rate = Some(self.sample_rate as f32);
        input.metadata.insert("source".to_string(), "SineGenerator".to_string());
        self.ticks += self.frame_size as u64;

        Ok(input)
    }
}
