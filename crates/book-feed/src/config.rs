//! Command-line / environment configuration for the feed processor.
//!
//! Every option can also be set through an `MD_*` environment variable
//! (e.g. `MD_STORAGE=hash`); the command line wins.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};

use book_core::book_data::{DEFAULT_LEVELS, MAX_LEVELS};
use book_core::StorageKind;
use book_protocol::PrintStyle;

use crate::handler::InputFormat;
use crate::publisher::Backpressure;

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum AdapterKind {
    /// Line-delimited file, buffered reads.
    File,
    /// Memory-mapped file.
    Mmap,
    /// One message per UDP datagram.
    Udp,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum PublisherKind {
    /// Print each snapshot on stdout.
    Print,
    /// Hand snapshots to consumer threads through a bounded queue.
    Queue,
    /// Send each snapshot as one binary datagram.
    Udp,
    /// Discard; the book is maintained but nothing is rendered.
    Null,
}

/// Feed processor configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "book-feed", version, about = "Maintain an order book from a market data feed")]
pub struct Config {
    /// Input file (file and mmap adapters).
    #[arg(long, env = "MD_INPUT")]
    pub input: Option<PathBuf>,

    /// Local address to receive datagrams on (udp adapter).
    #[arg(long, env = "MD_UDP_BIND")]
    pub udp_bind: Option<SocketAddr>,

    #[arg(long, env = "MD_ADAPTER", value_enum, default_value_t = AdapterKind::File)]
    pub adapter: AdapterKind,

    #[arg(long, env = "MD_FORMAT", value_enum, default_value_t = InputFormat::Csv)]
    pub format: InputFormat,

    /// Price-level storage: map, hash or vector.
    #[arg(long, env = "MD_STORAGE", default_value_t = StorageKind::Map)]
    pub storage: StorageKind,

    #[arg(long, env = "MD_PUBLISHER", value_enum, default_value_t = PublisherKind::Print)]
    pub publisher: PublisherKind,

    /// Presentation for printed snapshots: text, betting or csv.
    #[arg(long, env = "MD_PRINT", default_value_t = PrintStyle::Text)]
    pub print: PrintStyle,

    /// Rendered depth per side.
    #[arg(long, env = "MD_LEVELS", default_value_t = DEFAULT_LEVELS, value_parser = parse_levels)]
    pub levels: usize,

    /// Queue publisher capacity, in snapshots.
    #[arg(long, env = "MD_QUEUE_CAPACITY", default_value_t = 1024)]
    pub queue_capacity: usize,

    /// What the queue publisher does when the queue is full.
    #[arg(long, env = "MD_BACKPRESSURE", value_enum, default_value_t = Backpressure::Block)]
    pub backpressure: Backpressure,

    /// Queue publisher consumer threads.
    #[arg(long, env = "MD_CONSUMERS", default_value_t = 1)]
    pub consumers: usize,

    /// Destination of the udp publisher.
    #[arg(long, env = "MD_PUBLISH_ADDRESS", default_value = "127.0.0.1:5000")]
    pub publish_address: SocketAddr,

    /// Destination is a multicast group (broadcast is used otherwise).
    #[arg(long, env = "MD_MULTICAST")]
    pub multicast: bool,

    /// Stop the udp adapter after this many messages.
    #[arg(long, env = "MD_EXPECT_COUNT", conflicts_with = "pre_roll")]
    pub expect_count: Option<u64>,

    /// Learn the udp message count from a first pre-roll datagram.
    #[arg(long, env = "MD_PRE_ROLL")]
    pub pre_roll: bool,
}

impl Config {
    /// Cross-field checks clap cannot express.
    pub fn validate(&self) -> Result<()> {
        match self.adapter {
            AdapterKind::File | AdapterKind::Mmap if self.input.is_none() => {
                bail!("--input is required with the {:?} adapter", self.adapter)
            }
            AdapterKind::Udp if self.udp_bind.is_none() => {
                bail!("--udp-bind is required with the udp adapter")
            }
            _ => {}
        }
        if self.publisher == PublisherKind::Queue {
            if self.queue_capacity == 0 {
                bail!("--queue-capacity must be at least 1");
            }
            if self.consumers == 0 {
                bail!("--consumers must be at least 1");
            }
        }
        Ok(())
    }
}

fn parse_levels(s: &str) -> Result<usize, String> {
    let levels: usize = s.parse().map_err(|e| format!("{e}"))?;
    if (1..=MAX_LEVELS).contains(&levels) {
        Ok(levels)
    } else {
        Err(format!("levels must be in 1..={MAX_LEVELS}"))
    }
}
