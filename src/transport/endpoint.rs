use crate::error::{Error, Result};
use zeromq::{Endpoint, PubSocket, Socket, SocketSend, ZmqMessage};

/// Listen address for `port` on all interfaces
pub fn bind_address(port: u16) -> String {
    format!("tcp://0.0.0.0:{}", port)
}

/// A PUB socket that is known to be bound.
///
/// Only [`PublishEndpoint::ensure_bound`] hands these out, so a frame can
/// never be sent on an unbound endpoint.
pub struct BoundSocket {
    socket: PubSocket,
    port: u16,
    local_port: u16,
    #[cfg(test)]
    fail_next_send: bool,
}

impl BoundSocket {
    /// Port requested by the caller
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Port actually listening; differs from `port()` only when binding port 0
    pub fn local_port(&self) -> u16 {
        self.local_port
    }

    /// Send one message containing `bytes` to all current subscribers.
    ///
    /// Waits until the transport accepts the message. `sequence` is only used
    /// to label the error.
    pub async fn publish(&mut self, bytes: &[u8], sequence: u64) -> Result<()> {
        #[cfg(test)]
        if std::mem::take(&mut self.fail_next_send) {
            return Err(Error::Send {
                sequence,
                reason: "simulated send failure".to_string(),
            });
        }

        // The socket queues the message per subscriber after this returns, so it
        // owns a copy; `bytes` stays in the encoder for the next frame
        let message = ZmqMessage::from(bytes.to_vec());
        self.socket
            .send(message)
            .await
            .map_err(|e| Error::Send {
                sequence,
                reason: e.to_string(),
            })
    }
}

/// Owns at most one bound PUB socket
#[derive(Default)]
pub struct PublishEndpoint {
    bound: Option<BoundSocket>,
    binds: u64,
}

impl PublishEndpoint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind to `port` unless already bound there.
    ///
    /// A socket bound to a different port is closed first. On failure the
    /// endpoint is left unbound.
    pub async fn ensure_bound(&mut self, port: u16) -> Result<&mut BoundSocket> {
        if self.bound.as_ref().map(|b| b.port) != Some(port) {
            self.close().await;

            let address = bind_address(port);
            let mut socket = PubSocket::new();
            let endpoint = socket
                .bind(&address)
                .await
                .map_err(|e| Error::Bind {
                    port,
                    reason: e.to_string(),
                })?;
            let local_port = match endpoint {
                Endpoint::Tcp(_, local) => local,
                _ => port,
            };

            self.binds += 1;
            log::info!("Data socket bound to {} (port {})", address, local_port);
            self.bound = Some(BoundSocket {
                socket,
                port,
                local_port,
                #[cfg(test)]
                fail_next_send: false,
            });
        }

        self.bound
            .as_mut()
            .ok_or(Error::PortUnavailable(port))
    }

    /// Release the socket. Safe to call when never bound.
    pub async fn close(&mut self) {
        if let Some(bound) = self.bound.take() {
            log::info!("Closing data socket on port {}", bound.local_port);
            for err in bound.socket.close().await {
                log::warn!("Error while closing data socket: {}", err);
            }
        }
    }

    /// Requested port, if bound
    pub fn port(&self) -> Option<u16> {
        self.bound.as_ref().map(|b| b.port)
    }

    /// Listening port, if bound
    pub fn local_port(&self) -> Option<u16> {
        self.bound.as_ref().map(|b| b.local_port)
    }

    pub fn is_bound(&self) -> bool {
        self.bound.is_some()
    }

    /// Number of successful binds since creation
    pub fn bind_count(&self) -> u64 {
        self.binds
    }

    /// Make the next `publish` on the bound socket fail
    #[cfg(test)]
    pub(crate) fn fail_next_send(&mut self) {
        if let Some(bound) = self.bound.as_mut() {
            bound.fail_next_send = true;
        }
    }
}
