//! Line-oriented control surface
//!
//! Stands in for the port / channel text fields of an editor panel:
//!
//! ```text
//! port 5556
//! channels 0,2,4
//! channels *
//! status
//! ```

use anyhow::{anyhow, Result};
use super::StreamPublisher;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlCommand {
    /// Port text as typed; validated when applied
    Port(String),
    /// Channel list text as typed; validated when applied
    Channels(String),
    Status,
}

impl ControlCommand {
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        match verb {
            "port" => Ok(ControlCommand::Port(rest.to_string())),
            "channels" => Ok(ControlCommand::Channels(rest.to_string())),
            "status" => Ok(ControlCommand::Status),
            "" => Err(anyhow!("Empty command")),
            other => Err(anyhow!("Unknown command: {}", other)),
        }
    }

    /// Apply to `publisher`, returning a status message for the user
    pub async fn apply(&self, publisher: &StreamPublisher) -> Result<String> {
        match self {
            ControlCommand::Port(text) => {
                publisher.set_port_text(text).await?;
                Ok("ZMQ port updated".to_string())
            }
            ControlCommand::Channels(text) => {
                publisher.set_channels(text).await?;
                Ok("Channel selection updated".to_string())
            }
            ControlCommand::Status => {
                let status = publisher.status().await;
                let metrics = publisher.metrics().snapshot();
                Ok(serde_json::to_string(&serde_json::json!({
                    "status": status,
                    "metrics": metrics,
                }))?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            ControlCommand::parse("port 5556").unwrap(),
            ControlCommand::Port("5556".to_string())
        );
        assert_eq!(
            ControlCommand::parse("  channels 1, 3 ").unwrap(),
            ControlCommand::Channels("1, 3".to_string())
        );
        assert_eq!(
            ControlCommand::parse("channels").unwrap(),
            ControlCommand::Channels(String::new())
        );
        assert_eq!(ControlCommand::parse("status").unwrap(), ControlCommand::Status);
        assert!(ControlCommand::parse("restart").is_err());
        assert!(ControlCommand::parse("   ").is_err());
    }
}
