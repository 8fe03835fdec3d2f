//! Message-processing wrapper around one order book.
//!
//! `MdHandler` owns the `OrderBook` and the publisher. For each raw
//! message it:
//! - decodes it with the configured front end (CSV or JSON),
//! - applies it to the book,
//! - hands every rendered `BookData` to the publisher.
//!
//! Failures are returned to the adapter, which logs them. They have
//! already been counted by the decoder or the book, so nothing here
//! touches the statistics.

use std::sync::Arc;

use clap::ValueEnum;

use book_core::{BookError, BookStorage, MarketEvent, OrderBook, Stats};
use book_protocol::{parse_input_line, parse_json_message};

use crate::publisher::Publisher;
use crate::types::MessageSink;

/// Wire encoding of input messages.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    /// Comma-delimited fields.
    Csv,
    /// One JSON array per message.
    Json,
}

impl InputFormat {
    /// `None` for input that carries no message (blank line, comment).
    pub fn decode(self, raw: &str, stats: &Stats) -> Option<Result<MarketEvent, BookError>> {
        match self {
            InputFormat::Csv => parse_input_line(raw, stats),
            InputFormat::Json => parse_json_message(raw, stats),
        }
    }
}

pub struct MdHandler<S: BookStorage> {
    book: OrderBook<S>,
    format: InputFormat,
    publisher: Box<dyn Publisher>,
    /// False when the publisher discards everything: skip rendering.
    render: bool,
    published: u64,
    rejected: u64,
}

impl<S: BookStorage> MdHandler<S> {
    pub fn new(book: OrderBook<S>, format: InputFormat, publisher: Box<dyn Publisher>) -> Self {
        let render = publisher.wants_records();
        MdHandler {
            book,
            format,
            publisher,
            render,
            published: 0,
            rejected: 0,
        }
    }

    pub fn book(&self) -> &OrderBook<S> {
        &self.book
    }

    pub fn stats(&self) -> &Arc<Stats> {
        self.book.stats()
    }

    /// Records handed to the publisher so far.
    pub fn published(&self) -> u64 {
        self.published
    }

    /// Messages that failed to decode or apply.
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    /// Stop the publisher: flush, drain and join whatever it runs.
    pub fn finish(&mut self) {
        self.publisher.stop();
    }

    fn handle(&mut self, raw: &str) -> Result<(), BookError> {
        let Some(decoded) = self.format.decode(raw, self.book.stats()) else {
            return Ok(());
        };
        let event = decoded?;

        if !self.render {
            self.book.apply(&event)?;
            return Ok(());
        }

        for data in self.book.process_event(&event)? {
            self.publisher.offer(data);
            self.published += 1;
        }
        Ok(())
    }
}

impl<S: BookStorage> MessageSink for MdHandler<S> {
    fn on_message(&mut self, raw: &str) -> Result<(), BookError> {
        let result = self.handle(raw);
        if result.is_err() {
            self.rejected += 1;
        }
        result
    }
}
