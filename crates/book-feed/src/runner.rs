//! Top-level wiring of one run.
//!
//! This module:
//! - Builds the adapter and publisher the configuration asks for.
//! - Picks the storage variant and builds the `MdHandler` for it.
//! - Drives the adapter to completion, stops the publisher and reports.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::info;

use book_core::{BookStorage, HashBook, MapBook, OrderBook, Stats, StorageKind, VectorBook};

use crate::adapter::{Adapter, FileAdapter, MmapAdapter, UdpAdapter};
use crate::config::{AdapterKind, Config, PublisherKind};
use crate::handler::MdHandler;
use crate::publisher::{NullPublisher, PrintPublisher, Publisher, QueuePublisher, UdpPublisher};

/// Outcome of a completed run.
#[derive(Debug, Clone, Copy)]
pub struct RunReport {
    /// Units of input read by the adapter.
    pub messages: u64,
    /// Messages that failed to decode or apply.
    pub rejected: u64,
    /// Records handed to the publisher.
    pub published: u64,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn nanos_per_message(&self) -> u128 {
        match self.messages {
            0 => 0,
            n => self.elapsed.as_nanos() / u128::from(n),
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Processed {} messages ({} rejected, {} published) in {:?}, {} ns/message",
            self.messages,
            self.rejected,
            self.published,
            self.elapsed,
            self.nanos_per_message()
        )
    }
}

pub fn build_adapter(config: &Config) -> Result<Box<dyn Adapter>> {
    let adapter: Box<dyn Adapter> = match config.adapter {
        AdapterKind::File => Box::new(FileAdapter::new(config.input.clone().context("--input is required")?)),
        AdapterKind::Mmap => Box::new(MmapAdapter::new(config.input.clone().context("--input is required")?)),
        AdapterKind::Udp => {
            let addr = config.udp_bind.context("--udp-bind is required")?;
            Box::new(UdpAdapter::bind(addr, config.expect_count, config.pre_roll)?)
        }
    };
    Ok(adapter)
}

pub fn build_publisher(config: &Config) -> Result<Box<dyn Publisher>> {
    let publisher: Box<dyn Publisher> = match config.publisher {
        PublisherKind::Print => Box::new(PrintPublisher::stdout(config.print)),
        PublisherKind::Queue => {
            let style = config.print;
            Box::new(
                QueuePublisher::spawn(config.queue_capacity, config.consumers, config.backpressure, move |_| {
                    PrintPublisher::stdout(style)
                })
                .context("starting queue consumers")?,
            )
        }
        PublisherKind::Udp => Box::new(
            UdpPublisher::new(config.publish_address, config.multicast)
                .with_context(|| format!("opening udp publisher to {}", config.publish_address))?,
        ),
        PublisherKind::Null => Box::new(NullPublisher),
    };
    Ok(publisher)
}

/// Run `adapter` to completion into a book of the configured storage kind.
///
/// The publisher is always stopped, even when the adapter fails.
pub fn run(
    config: &Config,
    adapter: &mut dyn Adapter,
    publisher: Box<dyn Publisher>,
    stats: Arc<Stats>,
) -> Result<RunReport> {
    info!(storage = %config.storage, levels = config.levels, "starting run");
    match config.storage {
        StorageKind::Map => run_with::<MapBook>(config, adapter, publisher, stats),
        StorageKind::Hash => run_with::<HashBook>(config, adapter, publisher, stats),
        StorageKind::Vector => run_with::<VectorBook>(config, adapter, publisher, stats),
    }
}

fn run_with<S: BookStorage>(
    config: &Config,
    adapter: &mut dyn Adapter,
    publisher: Box<dyn Publisher>,
    stats: Arc<Stats>,
) -> Result<RunReport> {
    let book = OrderBook::<S>::with_stats(stats).with_depth(config.levels);
    let mut handler = MdHandler::new(book, config.format, publisher);

    let result = adapter.wait().and_then(|()| {
        let started = Instant::now();
        adapter.start(&mut handler)?;
        Ok(started.elapsed())
    });
    handler.finish();
    let elapsed = result?;

    Ok(RunReport {
        messages: adapter.counter(),
        rejected: handler.rejected(),
        published: handler.published(),
        elapsed,
    })
}
