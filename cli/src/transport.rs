//! Peer link selection: the process's own stdio, or a TCP connection.

use std::io::{self, BufReader, StdinLock, StdoutLock};
use std::net::TcpStream;

use anyhow::{Context, Result};

use gridsig_core::LinePeer;

pub enum Transport {
    /// stdin/stdout, e.g. when launched by `socat` or `ncat -e`.
    Stdio(LinePeer<StdinLock<'static>, StdoutLock<'static>>),
    Tcp(LinePeer<BufReader<TcpStream>, TcpStream>),
}

impl Transport {
    pub fn stdio() -> Self {
        Transport::Stdio(LinePeer::new(io::stdin().lock(), io::stdout().lock()))
    }

    pub fn connect(addr: &str) -> Result<Self> {
        let stream =
            TcpStream::connect(addr).with_context(|| format!("connecting to peer at {addr}"))?;
        // Request-reply lockstep: small writes must not wait on Nagle.
        if let Err(e) = stream.set_nodelay(true) {
            tracing::warn!("Failed to set TCP_NODELAY: {e}");
        }
        let reader = stream
            .try_clone()
            .context("cloning peer socket for reading")?;
        tracing::info!(%addr, "Connected to peer");
        Ok(Transport::Tcp(LinePeer::new(BufReader::new(reader), stream)))
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Transport::Stdio(_) => "stdio",
            Transport::Tcp(_) => "tcp",
        }
    }
}
