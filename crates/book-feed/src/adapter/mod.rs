//! Input adapters.
//!
//! An adapter reads units of input (lines, datagrams) and hands each one
//! to a [`MessageSink`]. A failed message is logged with its sequence
//! number and raw text, then skipped; only I/O failures of the adapter
//! itself end a run early.
//!
//! - [`FileAdapter`]: buffered line reader
//! - [`MmapAdapter`]: memory-mapped file split on `\n`
//! - [`UdpAdapter`]: one message per datagram

mod file;
mod mmap;
mod udp;

use anyhow::Result;
use tracing::{error, warn};

pub use file::FileAdapter;
pub use mmap::MmapAdapter;
pub use udp::UdpAdapter;

use crate::types::{MessageSink, StopHandle};

pub trait Adapter: Send {
    /// Pre-roll before timing starts. Most adapters have none.
    fn wait(&mut self) -> Result<()> {
        Ok(())
    }

    /// Feed every unit of input to `sink` until exhausted or stopped.
    fn start(&mut self, sink: &mut dyn MessageSink) -> Result<()>;

    /// Handle that makes `start` return at the next unit boundary.
    fn stop_handle(&self) -> StopHandle;

    /// Units of input read so far.
    fn counter(&self) -> u64;
}

/// Hand one message to the sink and log a failure.
pub(crate) fn dispatch(sink: &mut dyn MessageSink, seq: u64, raw: &str) {
    if let Err(err) = sink.on_message(raw) {
        if err.is_stream_integrity() {
            error!(seq, raw, %err, "order and trade streams disagree, message skipped");
        } else {
            warn!(seq, raw, %err, "message rejected");
        }
    }
}
