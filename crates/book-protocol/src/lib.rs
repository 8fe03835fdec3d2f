//! book-protocol
//!
//! Wire-level decoding of market data messages and rendering of book
//! snapshots.
//!
//! This crate turns raw input (`&str`) into logical events
//! (`book_core::MarketEvent`) and `book_core::BookData` into text or
//! bytes.
//!
//! - [`csv_codec`]    : comma-delimited lines in, CSV rows out
//! - [`json_codec`]   : JSON arrays in
//! - [`fields`]       : shared typed field decoder behind both
//! - [`text_format`]  : text / betting / CSV presentation
//! - [`binary_codec`] : fixed binary record (for UDP)

pub mod wire_types;
pub mod fields;
pub mod csv_codec;
pub mod json_codec;
pub mod text_format;
pub mod binary_codec;

pub use binary_codec::{decode_book_data, encode_book_data, ProtocolError};
pub use csv_codec::parse_input_line;
pub use json_codec::parse_json_message;
pub use text_format::{render, PrintStyle};
