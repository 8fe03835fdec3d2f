//! Snapshot publishers.
//!
//! A publisher receives every rendered `BookData` by value; the book
//! keeps nothing that points into it. `stop` must flush or drain
//! anything in flight before it returns.
//!
//! - [`PrintPublisher`]: text, betting or CSV presentation on a writer
//! - [`QueuePublisher`]: bounded queue drained by consumer threads
//! - [`UdpPublisher`]: binary record per datagram
//! - [`NullPublisher`]: discards everything

mod null;
mod print;
mod queue;
mod udp;

use book_core::BookData;

pub use null::NullPublisher;
pub use print::PrintPublisher;
pub use queue::{Backpressure, QueuePublisher};
pub use udp::UdpPublisher;

pub trait Publisher: Send {
    /// Take ownership of one record.
    fn offer(&mut self, data: BookData);

    /// Flush / drain / join. Called once, after the last `offer`.
    fn stop(&mut self);

    /// Whether records are worth rendering at all.
    fn wants_records(&self) -> bool {
        true
    }
}

impl<P: Publisher + ?Sized> Publisher for Box<P> {
    fn offer(&mut self, data: BookData) {
        (**self).offer(data)
    }

    fn stop(&mut self) {
        (**self).stop()
    }

    fn wants_records(&self) -> bool {
        (**self).wants_records()
    }
}
