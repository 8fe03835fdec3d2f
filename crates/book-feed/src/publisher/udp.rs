use std::io;
use std::net::{SocketAddr, UdpSocket};

use tracing::{debug, info, warn};

use book_core::BookData;
use book_protocol::encode_book_data;

use super::Publisher;

/// Sends each record as one binary datagram (see `binary_codec`).
pub struct UdpPublisher {
    socket: UdpSocket,
    target: SocketAddr,
    buf: Vec<u8>,
    sent: u64,
    errors: u64,
}

impl UdpPublisher {
    /// Bind an ephemeral local socket aimed at `target`.
    ///
    /// Broadcast is enabled unless `multicast` is set, in which case the
    /// TTL is kept to the local segment.
    pub fn new(target: SocketAddr, multicast: bool) -> io::Result<Self> {
        let local: SocketAddr = if target.is_ipv4() {
            ([0u8, 0, 0, 0], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };
        let socket = UdpSocket::bind(local)?;
        if multicast {
            socket.set_multicast_ttl_v4(1)?;
            socket.set_multicast_loop_v4(true)?;
        } else {
            socket.set_broadcast(true)?;
        }

        info!(%target, multicast, "udp publisher ready");
        Ok(UdpPublisher {
            socket,
            target,
            buf: Vec::new(),
            sent: 0,
            errors: 0,
        })
    }

    pub fn sent(&self) -> u64 {
        self.sent
    }
}

impl Publisher for UdpPublisher {
    fn offer(&mut self, data: BookData) {
        self.buf.clear();
        encode_book_data(&data, &mut self.buf);
        match self.socket.send_to(&self.buf, self.target) {
            Ok(_) => self.sent += 1,
            Err(e) => {
                debug!(error = %e, "udp send failed");
                self.errors += 1;
            }
        }
    }

    fn stop(&mut self) {
        info!(sent = self.sent, "udp publisher stopped");
        if self.errors > 0 {
            warn!(errors = self.errors, "udp publisher failed sends");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use book_core::{Event, LevelQuote, Side};
    use book_protocol::decode_book_data;
    use book_protocol::wire_types::book_data_len;

    #[test]
    fn one_record_per_datagram() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        receiver.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        let mut publisher = UdpPublisher::new(receiver.local_addr().unwrap(), false).unwrap();

        let mut data = BookData::new(5, Event::Add);
        data.side_mut(Side::Ask)[0] = LevelQuote::new(3, 40, 1010);
        publisher.offer(data);
        publisher.stop();

        let mut buf = [0u8; 1024];
        let len = receiver.recv(&mut buf).unwrap();
        assert_eq!(len, book_data_len(5));
        assert_eq!(decode_book_data(&buf[..len], 5), Ok(data));
        assert_eq!(publisher.sent(), 1);
    }
}
