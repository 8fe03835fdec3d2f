//! Bounded hand-off queue between the ingestion thread and consumers.
//!
//! The ingestion thread is the only writer. Each consumer thread owns
//! its own sink publisher and drains records from the shared queue
//! until the writer side is closed, then stops its sink.
//!
//! When the queue is full:
//! - `Backpressure::Block`: the writer waits for room.
//! - `Backpressure::Drop`: the record is discarded and counted.

use std::io;
use std::thread::{self, JoinHandle};

use clap::ValueEnum;
use crossbeam_channel::{bounded, Sender, TrySendError};
use tracing::{debug, info, warn};

use book_core::BookData;

use super::Publisher;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, ValueEnum)]
pub enum Backpressure {
    /// Wait for room.
    #[default]
    Block,
    /// Discard and count.
    Drop,
}

pub struct QueuePublisher {
    tx: Option<Sender<BookData>>,
    consumers: Vec<JoinHandle<u64>>,
    backpressure: Backpressure,
    offered: u64,
    dropped: u64,
}

impl QueuePublisher {
    /// Start `consumers` threads; `make_sink(i)` builds the sink for thread `i`.
    pub fn spawn<F, P>(
        capacity: usize,
        consumers: usize,
        backpressure: Backpressure,
        make_sink: F,
    ) -> io::Result<Self>
    where
        F: Fn(usize) -> P,
        P: Publisher + 'static,
    {
        let (tx, rx) = bounded::<BookData>(capacity);

        let mut handles = Vec::with_capacity(consumers);
        for i in 0..consumers {
            let rx = rx.clone();
            let mut sink = make_sink(i);
            let handle = thread::Builder::new()
                .name(format!("book-consumer-{i}"))
                .spawn(move || {
                    let mut drained = 0u64;
                    while let Ok(data) = rx.recv() {
                        sink.offer(data);
                        drained += 1;
                    }
                    sink.stop();
                    debug!(consumer = i, drained, "consumer finished");
                    drained
                })?;
            handles.push(handle);
        }

        info!(capacity, consumers, ?backpressure, "queue publisher started");
        Ok(QueuePublisher {
            tx: Some(tx),
            consumers: handles,
            backpressure,
            offered: 0,
            dropped: 0,
        })
    }

    /// Records discarded so far (full queue under `Drop`, or no consumer left).
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl Publisher for QueuePublisher {
    fn offer(&mut self, data: BookData) {
        let Some(tx) = &self.tx else {
            self.dropped += 1;
            return;
        };
        self.offered += 1;

        let delivered = match self.backpressure {
            Backpressure::Block => tx.send(data).is_ok(),
            Backpressure::Drop => match tx.try_send(data) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => false,
                Err(TrySendError::Disconnected(_)) => {
                    debug!("no consumer left");
                    false
                }
            },
        };
        if !delivered {
            self.dropped += 1;
        }
    }

    fn stop(&mut self) {
        // Closing the writer lets consumers drain what is queued and exit.
        drop(self.tx.take());

        let mut drained = 0;
        for handle in self.consumers.drain(..) {
            match handle.join() {
                Ok(n) => drained += n,
                Err(_) => warn!("consumer thread panicked"),
            }
        }

        info!(offered = self.offered, drained, "queue publisher stopped");
        if self.dropped > 0 {
            warn!(dropped = self.dropped, "queue publisher dropped records");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use crossbeam_channel::{Receiver, Sender};

    use super::*;
    use crate::publisher::testing::Collect;
    use book_core::Event;

    fn record(depth: usize) -> BookData {
        BookData::new(depth, Event::Add)
    }

    #[test]
    fn stop_drains_every_queued_record() {
        let collected = Arc::new(Mutex::new(Vec::new()));
        let sink_records = Arc::clone(&collected);
        let mut publisher = QueuePublisher::spawn(4, 2, Backpressure::Block, move |_| {
            let (collect, records) = Collect::new();
            sink_records.lock().unwrap().push(records);
            collect
        })
        .unwrap();

        for depth in 1..=50 {
            publisher.offer(record(depth % 20 + 1));
        }
        publisher.stop();

        let total: usize = collected.lock().unwrap().iter().map(|r| r.lock().unwrap().len()).sum();
        assert_eq!(total, 50);
        assert_eq!(publisher.dropped(), 0);
    }

    /// Signals when it has taken a record, then waits to be released.
    struct Gated {
        taken: Sender<()>,
        release: Receiver<()>,
        seen: Arc<Mutex<Vec<usize>>>,
    }

    impl Publisher for Gated {
        fn offer(&mut self, data: BookData) {
            let _ = self.taken.send(());
            let _ = self.release.recv();
            self.seen.lock().unwrap().push(data.depth());
        }

        fn stop(&mut self) {}
    }

    #[test]
    fn drop_policy_discards_when_full() {
        let (taken_tx, taken_rx) = crossbeam_channel::unbounded();
        let (release_tx, release_rx) = crossbeam_channel::unbounded();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let gate_seen = Arc::clone(&seen);
        let mut publisher = QueuePublisher::spawn(1, 1, Backpressure::Drop, move |_| Gated {
            taken: taken_tx.clone(),
            release: release_rx.clone(),
            seen: Arc::clone(&gate_seen),
        })
        .unwrap();

        publisher.offer(record(1));
        taken_rx.recv().unwrap(); // consumer is now blocked inside offer
        publisher.offer(record(2)); // fills the queue
        publisher.offer(record(3)); // full: dropped

        release_tx.send(()).unwrap();
        release_tx.send(()).unwrap();
        publisher.stop();

        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
        assert_eq!(publisher.dropped(), 1);
    }
}
