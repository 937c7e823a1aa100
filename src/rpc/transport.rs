//! Message transport: one bidirectional text channel per client.
//!
//! Sessions are generic over [`ObserverLink`], so the control logic runs
//! unchanged over TCP in production and over in-memory links in tests.
//!
//! [`TcpLink`] frames JSON text with the length-prefix codec and polls a
//! non-blocking socket on the `async-io-mini` reactor timer.

use std::collections::VecDeque;
use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use async_io_mini::Timer;
use log::{debug, warn};

use super::codec::{FrameDecoder, encode_frame};
use crate::error::LinkError;

/// Message-oriented client channel.
#[allow(async_fn_in_trait)]
pub trait ObserverLink {
    /// Wait for the next complete message. `Ok(None)` is a clean close.
    async fn recv(&mut self) -> Result<Option<String>, LinkError>;

    /// Deliver one message.
    async fn send(&mut self, text: &str) -> Result<(), LinkError>;
}

const READ_BUF_SIZE: usize = 1024;

/// Socket poll interval while idle.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// A length-prefix framed JSON link over a TCP stream.
pub struct TcpLink {
    stream: TcpStream,
    peer: Option<SocketAddr>,
    decoder: FrameDecoder,
    /// Decoded messages not yet handed out.
    inbox: VecDeque<String>,
}

impl TcpLink {
    pub fn new(stream: TcpStream) -> Result<Self, LinkError> {
        stream.set_nonblocking(true)?;
        stream.set_nodelay(true)?;
        let peer = stream.peer_addr().ok();
        Ok(Self {
            stream,
            peer,
            decoder: FrameDecoder::new(),
            inbox: VecDeque::new(),
        })
    }

    fn absorb(&mut self, mut data: &[u8]) {
        while !data.is_empty() {
            let (used, frame) = self.decoder.feed(data);
            if let Some(frame) = frame {
                match core::str::from_utf8(frame) {
                    Ok(text) => self.inbox.push_back(text.to_owned()),
                    // Surfaced as malformed JSON by the session.
                    Err(_) => self
                        .inbox
                        .push_back(String::from_utf8_lossy(frame).into_owned()),
                }
            }
            data = &data[used..];
        }
    }
}

impl ObserverLink for TcpLink {
    async fn recv(&mut self) -> Result<Option<String>, LinkError> {
        let mut buf = [0u8; READ_BUF_SIZE];
        loop {
            if let Some(text) = self.inbox.pop_front() {
                return Ok(Some(text));
            }
            match self.stream.read(&mut buf) {
                Ok(0) => {
                    debug!("LINK {:?}: closed by peer", self.peer);
                    return Ok(None);
                }
                Ok(n) => self.absorb(&buf[..n]),
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    Timer::after(POLL_INTERVAL).await;
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn send(&mut self, text: &str) -> Result<(), LinkError> {
        let Some(frame) = encode_frame(text.as_bytes()) else {
            warn!("LINK {:?}: {}-byte message too large, skipped", self.peer, text.len());
            return Ok(());
        };
        let mut written = 0;
        while written < frame.len() {
            match self.stream.write(&frame[written..]) {
                Ok(0) => return Err(LinkError::Disconnected),
                Ok(n) => written += n,
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    Timer::after(POLL_INTERVAL).await;
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}
