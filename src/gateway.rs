use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

const MSG_REQUEST_ID: &str = "ID";
const MSG_ACKNOWLEDGE_ID: &str = "ACK";

/// Handshake and connection failures. All of these are fatal to the
/// session; the pipeline never retries a failed handshake.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("connection failed: {0}")]
    Connection(#[from] std::io::Error),

    #[error("timed out waiting for the server during the handshake")]
    Timeout,

    #[error("unexpected handshake message from server: {0:?}")]
    Protocol(String),

    #[error("server acknowledged user id {received:?}, expected {expected:?}")]
    Mismatch { expected: String, received: String },
}

/// Session lifecycle. Transitions are one-directional; `Closed` is
/// terminal and reachable from any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Unauthenticated,
    Authenticated,
    Streaming,
    Closed,
}

impl ConnectionState {
    pub fn can_transition_to(&self, target: &ConnectionState) -> bool {
        use ConnectionState::*;

        matches!(
            (self, target),
            (Unauthenticated, Authenticated)
                | (Authenticated, Streaming)
                | (Unauthenticated, Closed)
                | (Authenticated, Closed)
                | (Streaming, Closed)
        )
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Unauthenticated => "Unauthenticated",
            Self::Authenticated => "Authenticated",
            Self::Streaming => "Streaming",
            Self::Closed => "Closed",
        }
    }
}

/// Byte-stream connection to the data collection server.
///
/// All reads are bounded by the configured timeout so the caller can
/// periodically check for cancellation instead of blocking forever.
pub struct Gateway {
    stream: TcpStream,
    state: ConnectionState,
    read_timeout: Duration,
}

impl Gateway {
    pub async fn connect(host: &str, port: u16, read_timeout: Duration) -> Result<Self, GatewayError> {
        log::info!("Connecting to {}:{}...", host, port);
        let stream = TcpStream::connect((host, port)).await?;
        Ok(Self {
            stream,
            state: ConnectionState::Unauthenticated,
            read_timeout,
        })
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Three-step credential handshake:
    /// expect `"ID"`, send `"ID,<user_id>\n"`, expect `"ACK,<user_id>"`.
    pub async fn authenticate(&mut self, user_id: &str) -> Result<(), GatewayError> {
        log::info!("Authenticating user for receiving data...");

        let message = self.recv_message().await?;
        if message != MSG_REQUEST_ID {
            return Err(GatewayError::Protocol(message));
        }
        log::info!("Received authentication request from the server. Sending credentials...");

        self.stream
            .write_all(format!("ID,{}\n", user_id).as_bytes())
            .await?;

        let message = self.recv_message().await?;
        if !message.starts_with(MSG_ACKNOWLEDGE_ID) {
            return Err(GatewayError::Protocol(message));
        }
        // The acknowledged id is the second comma-separated field;
        // anything after a further comma is not part of it.
        let ack_id = match message.split(',').nth(1) {
            Some(id) => id.to_string(),
            None => return Err(GatewayError::Protocol(message)),
        };

        if ack_id != user_id {
            return Err(GatewayError::Mismatch {
                expected: user_id.to_string(),
                received: ack_id,
            });
        }

        self.state = ConnectionState::Authenticated;
        log::info!("Authentication successful.");
        Ok(())
    }

    /// Consume the gateway and hand the raw stream to the ingestion
    /// loop. Only valid once authenticated.
    pub fn into_stream(mut self) -> Result<TcpStream, GatewayError> {
        if !self.state.can_transition_to(&ConnectionState::Streaming) {
            return Err(GatewayError::Protocol(format!(
                "cannot start streaming from state {}",
                self.state.name()
            )));
        }
        self.state = ConnectionState::Streaming;
        Ok(self.stream)
    }

    async fn recv_message(&mut self) -> Result<String, GatewayError> {
        let mut buf = [0u8; 256];
        let n = timeout(self.read_timeout, self.stream.read(&mut buf))
            .await
            .map_err(|_| GatewayError::Timeout)??;
        if n == 0 {
            return Err(GatewayError::Protocol("connection closed".to_string()));
        }
        Ok(String::from_utf8_lossy(&buf[..n]).trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_transitions() {
        let unauth = ConnectionState::Unauthenticated;
        let auth = ConnectionState::Authenticated;

        assert!(unauth.can_transition_to(&auth));
        assert!(!auth.can_transition_to(&unauth));
        assert!(auth.can_transition_to(&ConnectionState::Streaming));
        assert!(!unauth.can_transition_to(&ConnectionState::Streaming));
    }

    #[test]
    fn test_closed_is_terminal_and_reachable_from_anywhere() {
        use ConnectionState::*;
        for state in [Unauthenticated, Authenticated, Streaming] {
            assert!(state.can_transition_to(&Closed));
        }
        for state in [Unauthenticated, Authenticated, Streaming, Closed] {
            assert!(!Closed.can_transition_to(&state));
        }
    }
}
