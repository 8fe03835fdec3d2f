//! book-feed
//!
//! Host process for the order book: reads a market data feed through an
//! adapter, maintains the book and publishes rendered snapshots.

pub mod adapter;
pub mod config;
pub mod handler;
pub mod publisher;
pub mod runner;
pub mod types;
