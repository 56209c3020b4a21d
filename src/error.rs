//! Error types for the publisher core

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Broad failure classes, used by callers that only care about policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected or unreadable configuration; previous configuration is still in effect
    Config,
    /// Socket creation, bind or send failure
    Transport,
    /// Selected channel does not exist in the current block
    ChannelOutOfRange,
    /// Malformed input data (block view or received frame)
    Data,
}

/// Publisher error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Port text did not parse as a TCP port
    #[error("Invalid data port value: {0:?}")]
    InvalidPort(String),

    /// Channel list item did not parse as a non-negative index
    #[error("Invalid channel {item:?} in channel list {spec:?}")]
    InvalidChannel {
        /// Offending item
        item: String,
        /// Full channel list text
        spec: String,
    },

    /// Creating or binding the publish socket failed
    #[error("Couldn't bind data socket on port {port}: {reason}")]
    Bind {
        /// Requested port
        port: u16,
        /// Transport error message
        reason: String,
    },

    /// Port failed to bind earlier and has not been reconfigured since
    #[error("Port {0} unavailable, waiting for a new port")]
    PortUnavailable(u16),

    /// Sending a frame failed
    #[error("Failed to send frame {sequence}: {reason}")]
    Send {
        /// Sequence number consumed by the failed frame
        sequence: u64,
        /// Transport error message
        reason: String,
    },

    /// Selected channel index exceeds the block's channel count
    #[error("Channel {channel} out of range (0..{available})")]
    ChannelOutOfRange {
        /// Selected index
        channel: usize,
        /// Channels present in the block
        available: usize,
    },

    /// Sample block view is inconsistent with its backing slice
    #[error("Invalid sample block: {0}")]
    InvalidBlock(String),

    /// Received bytes are not a valid frame
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file error
    #[error("Config parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Failure class of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidPort(_)
            | Error::InvalidChannel { .. }
            | Error::Io(_)
            | Error::Json(_) => ErrorKind::Config,
            Error::Bind { .. } | Error::PortUnavailable(_) | Error::Send { .. } => {
                ErrorKind::Transport
            }
            Error::ChannelOutOfRange { .. } => ErrorKind::ChannelOutOfRange,
            Error::InvalidBlock(_) | Error::MalformedFrame(_) => ErrorKind::Data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(Error::InvalidPort("abc".into()).kind(), ErrorKind::Config);
        assert_eq!(Error::PortUnavailable(5555).kind(), ErrorKind::Transport);
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert_eq!(Error::Io(io).kind(), ErrorKind::Config);
        assert_eq!(
            Error::ChannelOutOfRange { channel: 5, available: 4 }.kind(),
            ErrorKind::ChannelOutOfRange
        );
    }

    #[test]
    fn test_messages_are_readable() {
        let err = Error::InvalidChannel {
            item: "x".into(),
            spec: "1,x".into(),
        };
        assert_eq!(err.to_string(), "Invalid channel \"x\" in channel list \"1,x\"");
    }
}
