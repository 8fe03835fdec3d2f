//! Binary encoding/decoding of [`BookData`] records.
//!
//! Record layout (big-endian, packed, no length prefix; the reader must
//! know `depth` out of band):
//!
//! ```text
//! bids  : depth × [contributors i32][quantity i32][price f64]
//! asks  : depth × [contributors i32][quantity i32][price f64]
//! last  : [side u8][quantity u32][price u32]
//! total : [side u8][quantity u32][price u32]
//! event : [tag u8]
//! ```
//!
//! Side and event are their ASCII chars (`B`/`S`/`U`, `A`/`M`/...).
//! One record is sent per UDP datagram.

use std::fmt;

use book_core::book_data::clamp_depth;
use book_core::{BookData, Event, LevelQuote, Side, TradeSummary};

use crate::wire_types::{book_data_len, SIDE_UNKNOWN};

/// Errors that can arise when decoding a binary record.
#[derive(Debug, PartialEq, Eq)]
pub enum ProtocolError {
    /// Buffer length does not match the record size for the depth.
    Length { expected: usize, actual: usize },
    /// Side byte is not `B`, `S` or `U`.
    InvalidSide(u8),
    /// Contributor or quantity field is negative.
    InvalidField(&'static str),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Length { expected, actual } => {
                write!(f, "Record length mismatch: got {}, expected {}", actual, expected)
            }
            ProtocolError::InvalidSide(b) => write!(f, "Invalid side byte: {:#04x}", b),
            ProtocolError::InvalidField(field) => write!(f, "Invalid field: {}", field),
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Append one record to `out`.
pub fn encode_book_data(data: &BookData, out: &mut Vec<u8>) {
    out.reserve(book_data_len(data.depth()));

    for level in data.bids().iter().chain(data.asks()) {
        out.extend_from_slice(&saturating_i32(level.contributors).to_be_bytes());
        out.extend_from_slice(&saturating_i32(level.quantity).to_be_bytes());
        out.extend_from_slice(&level.price.to_be_bytes());
    }

    for summary in [data.last_trade, data.total_traded] {
        out.push(side_byte(summary.side));
        out.extend_from_slice(&summary.quantity.to_be_bytes());
        out.extend_from_slice(&summary.price.to_be_bytes());
    }

    out.push(data.event.as_char() as u8);
}

/// Level fields are signed on the wire; larger values clamp to `i32::MAX`.
fn saturating_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Decode one record of the given depth. `buf` must hold exactly one record.
pub fn decode_book_data(buf: &[u8], depth: usize) -> Result<BookData, ProtocolError> {
    let depth = clamp_depth(depth);
    let expected = book_data_len(depth);
    if buf.len() != expected {
        return Err(ProtocolError::Length {
            expected,
            actual: buf.len(),
        });
    }

    let mut reader = Reader { buf, pos: 0 };
    let mut data = BookData::new(depth, Event::Unknown);

    for side in [Side::Bid, Side::Ask] {
        for slot in data.side_mut(side).iter_mut() {
            let contributors = reader.i32();
            let quantity = reader.i32();
            let price = reader.f64();
            *slot = LevelQuote {
                contributors: u32::try_from(contributors)
                    .map_err(|_| ProtocolError::InvalidField("contributors"))?,
                quantity: u32::try_from(quantity)
                    .map_err(|_| ProtocolError::InvalidField("quantity"))?,
                price,
            };
        }
    }

    data.last_trade = reader.trade_summary()?;
    data.total_traded = reader.trade_summary()?;
    data.event = Event::from_char(reader.u8() as char);
    Ok(data)
}

fn side_byte(side: Option<Side>) -> u8 {
    side.map_or(SIDE_UNKNOWN, Side::as_char) as u8
}

// -----------------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------------

/// Reads fixed-width fields; the caller has checked the total length.
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl Reader<'_> {
    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut arr = [0u8; N];
        arr.copy_from_slice(&self.buf[self.pos..self.pos + N]);
        self.pos += N;
        arr
    }

    fn u8(&mut self) -> u8 {
        self.take::<1>()[0]
    }

    fn i32(&mut self) -> i32 {
        i32::from_be_bytes(self.take())
    }

    fn u32(&mut self) -> u32 {
        u32::from_be_bytes(self.take())
    }

    fn f64(&mut self) -> f64 {
        f64::from_be_bytes(self.take())
    }

    fn trade_summary(&mut self) -> Result<TradeSummary, ProtocolError> {
        let byte = self.u8();
        let side = match byte as char {
            SIDE_UNKNOWN => None,
            c => Some(Side::from_char(c).ok_or(ProtocolError::InvalidSide(byte))?),
        };
        Ok(TradeSummary {
            side,
            quantity: self.u32(),
            price: self.u32(),
        })
    }
}
