use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info};

use super::{dispatch, Adapter};
use crate::types::{MessageSink, StopHandle};

/// Read timeout between stop-flag checks.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Largest datagram accepted.
const MAX_DATAGRAM: usize = 64 * 1024;

/// One message per datagram on a bound socket.
///
/// With `pre_roll`, [`wait`](Adapter::wait) blocks for a first datagram
/// holding the number of messages that follow, and `start` returns once
/// that many have arrived. Otherwise `expected` (if any) bounds the run.
pub struct UdpAdapter {
    socket: UdpSocket,
    pre_roll: bool,
    expected: Option<u64>,
    stop: StopHandle,
    counter: u64,
    buf: Vec<u8>,
}

impl UdpAdapter {
    pub fn bind(addr: SocketAddr, expected: Option<u64>, pre_roll: bool) -> Result<Self> {
        let socket = UdpSocket::bind(addr).with_context(|| format!("binding {addr}"))?;
        socket
            .set_read_timeout(Some(POLL_INTERVAL))
            .context("setting udp read timeout")?;
        info!(addr = %socket.local_addr()?, "udp adapter bound");

        Ok(UdpAdapter {
            socket,
            pre_roll,
            expected,
            stop: StopHandle::new(),
            counter: 0,
            buf: vec![0; MAX_DATAGRAM],
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Next datagram, or `None` once stopped.
    fn recv(&mut self) -> Result<Option<usize>> {
        loop {
            if self.stop.is_stopped() {
                return Ok(None);
            }
            match self.socket.recv_from(&mut self.buf) {
                Ok((len, _)) => return Ok(Some(len)),
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => continue,
                Err(e) => return Err(e).context("udp receive"),
            }
        }
    }

    fn text(&self, len: usize) -> String {
        let raw = String::from_utf8_lossy(&self.buf[..len]);
        raw.trim_end_matches(['\r', '\n']).to_string()
    }
}

impl Adapter for UdpAdapter {
    fn wait(&mut self) -> Result<()> {
        if !self.pre_roll {
            return Ok(());
        }
        info!("waiting for pre-roll datagram");
        let Some(len) = self.recv()? else {
            return Ok(());
        };
        let text = self.text(len);
        let expected = text
            .trim()
            .parse::<u64>()
            .with_context(|| format!("pre-roll datagram {text:?} is not a message count"))?;
        info!(expected, "pre-roll received");
        self.expected = Some(expected);
        Ok(())
    }

    fn start(&mut self, sink: &mut dyn MessageSink) -> Result<()> {
        while self.expected.map_or(true, |n| self.counter < n) {
            let Some(len) = self.recv()? else {
                debug!("udp adapter stopped");
                break;
            };
            self.counter += 1;
            let text = self.text(len);
            dispatch(sink, self.counter, &text);
        }

        info!(datagrams = self.counter, "udp adapter finished");
        Ok(())
    }

    fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    fn counter(&self) -> u64 {
        self.counter
    }
}
