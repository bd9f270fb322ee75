//! Byte link abstraction for the node-to-node line.
//!
//! The protocol needs nothing more than a reliable, ordered, half-duplex
//! byte pipe: one byte out, one byte in, with a bounded-wait receive. A
//! 9600-8E1 UART satisfies the contract; any conforming transport may
//! substitute. Production nodes here use [`TcpLink`]; the test harness uses
//! an in-memory channel pair.

use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::error::LinkError;

/// A reliable, ordered, byte-oriented link to the peer node.
pub trait WireLink: Send {
    /// Send one byte.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Closed`] or [`LinkError::Io`] if the transport
    /// failed.
    fn send(&mut self, byte: u8) -> Result<(), LinkError>;

    /// Receive one byte, blocking until it arrives.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Closed`] if the peer is gone.
    fn recv(&mut self) -> Result<u8, LinkError>;

    /// Receive one byte, waiting at most `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::TimedOut`] if nothing arrived in time.
    fn recv_deadline(&mut self, timeout: Duration) -> Result<u8, LinkError>;

    /// Send a run of bytes in order.
    ///
    /// # Errors
    ///
    /// Propagates the first send failure.
    fn send_all(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        for &byte in bytes {
            self.send(byte)?;
        }
        Ok(())
    }
}

/// Reference link implementation over a TCP stream.
#[derive(Debug)]
pub struct TcpLink {
    stream: TcpStream,
}

impl TcpLink {
    /// Wrap an accepted stream.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if socket options cannot be set.
    pub fn new(stream: TcpStream) -> std::io::Result<Self> {
        stream.set_nodelay(true)?;
        Ok(Self { stream })
    }

    /// Connect to a listening peer.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the connection cannot be established.
    pub fn connect<A: ToSocketAddrs>(addr: A) -> std::io::Result<Self> {
        Self::new(TcpStream::connect(addr)?)
    }

    fn read_one(&mut self) -> Result<u8, LinkError> {
        let mut buf = [0u8; 1];
        match self.stream.read(&mut buf) {
            Ok(0) => Err(LinkError::Closed),
            Ok(_) => {
                tracing::trace!(byte = buf[0], "link recv");
                Ok(buf[0])
            },
            Err(err)
                if err.kind() == std::io::ErrorKind::WouldBlock
                    || err.kind() == std::io::ErrorKind::TimedOut =>
            {
                Err(LinkError::TimedOut { timeout: Duration::ZERO })
            },
            Err(err) => Err(LinkError::Io { message: err.to_string() }),
        }
    }
}

impl WireLink for TcpLink {
    fn send(&mut self, byte: u8) -> Result<(), LinkError> {
        tracing::trace!(byte, "link send");
        self.stream
            .write_all(&[byte])
            .map_err(|err| LinkError::Io { message: err.to_string() })
    }

    fn recv(&mut self) -> Result<u8, LinkError> {
        self.stream
            .set_read_timeout(None)
            .map_err(|err| LinkError::Io { message: err.to_string() })?;
        self.read_one()
    }

    fn recv_deadline(&mut self, timeout: Duration) -> Result<u8, LinkError> {
        if timeout.is_zero() {
            return Err(LinkError::TimedOut { timeout });
        }
        self.stream
            .set_read_timeout(Some(timeout))
            .map_err(|err| LinkError::Io { message: err.to_string() })?;
        self.read_one().map_err(|err| match err {
            LinkError::TimedOut { .. } => LinkError::TimedOut { timeout },
            other => other,
        })
    }
}

impl<L: WireLink + ?Sized> WireLink for &mut L {
    fn send(&mut self, byte: u8) -> Result<(), LinkError> {
        (**self).send(byte)
    }

    fn recv(&mut self) -> Result<u8, LinkError> {
        (**self).recv()
    }

    fn recv_deadline(&mut self, timeout: Duration) -> Result<u8, LinkError> {
        (**self).recv_deadline(timeout)
    }
}
