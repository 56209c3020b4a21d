use crate::error::{Error, Result};

/// Token selecting every channel of the block
pub const WILDCARD: &str = "*";

/// Which channels go into a frame, and in what order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChannelSpec {
    /// Every channel of the block, in block order
    #[default]
    All,
    /// Explicit indices; order and repeats are kept as given
    Select(Vec<usize>),
}

impl ChannelSpec {
    /// Parse a comma-separated channel list.
    ///
    /// Empty text or `*` selects all channels. Empty items (`"1,,2"`) are
    /// skipped; a list with no items left also selects all channels.
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed == WILDCARD {
            return Ok(ChannelSpec::All);
        }

        let mut indices = Vec::new();
        for item in trimmed.split(',') {
            let item = item.trim();
            if item.is_empty() {
                continue;
            }
            let index = item.parse::<usize>().map_err(|_| Error::InvalidChannel {
                item: item.to_string(),
                spec: text.to_string(),
            })?;
            indices.push(index);
        }

        if indices.is_empty() {
            Ok(ChannelSpec::All)
        } else {
            Ok(ChannelSpec::Select(indices))
        }
    }

    /// Resolve against a block, writing the indices to extract into `out`.
    ///
    /// `out` is cleared first so the caller can reuse it across blocks.
    /// On error `out` is left empty.
    pub fn resolve_into(&self, block_channels: usize, out: &mut Vec<usize>) -> Result<()> {
        out.clear();
        match self {
            ChannelSpec::All => out.extend(0..block_channels),
            ChannelSpec::Select(indices) => {
                for &ch in indices {
                    validate_channel(ch, block_channels)?;
                }
                out.extend_from_slice(indices);
            }
        }
        Ok(())
    }

    /// Resolve against a block with `block_channels` channels
    pub fn resolve(&self, block_channels: usize) -> Result<Vec<usize>> {
        let mut out = Vec::new();
        self.resolve_into(block_channels, &mut out)?;
        Ok(out)
    }
}

fn validate_channel(ch: usize, available: usize) -> Result<()> {
    if ch >= available {
        return Err(Error::ChannelOutOfRange {
            channel: ch,
            available,
        });
    }
    Ok(())
}

/// Holds the user's channel text and the spec parsed from it
#[derive(Debug, Clone)]
pub struct ChannelSelector {
    text: String,
    spec: ChannelSpec,
}

impl Default for ChannelSelector {
    fn default() -> Self {
        Self {
            text: WILDCARD.to_string(),
            spec: ChannelSpec::All,
        }
    }
}

impl ChannelSelector {
    pub fn new(text: &str) -> Result<Self> {
        Ok(Self {
            text: text.to_string(),
            spec: ChannelSpec::parse(text)?,
        })
    }

    /// Replace the channel list. On error the previous list stays in effect.
    pub fn set_spec(&mut self, text: &str) -> Result<&ChannelSpec> {
        let spec = ChannelSpec::parse(text)?;
        self.text = text.to_string();
        self.spec = spec;
        Ok(&self.spec)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn spec(&self) -> &ChannelSpec {
        &self.spec
    }

    pub fn resolve_into(&self, block_channels: usize, out: &mut Vec<usize>) -> Result<()> {
        self.spec.resolve_into(block_channels, out)
    }
}
