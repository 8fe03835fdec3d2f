//! Human-readable rendering of [`BookData`].
//!
//! Three styles, picked per run:
//! - `Text`: level table with Bid / Ask headings.
//! - `Betting`: the same table headed Back / Lay.
//! - `Csv`: one row per record, see [`csv_codec::format_book_data`].
//!
//! The record's event picks the shape: trades print the traded totals,
//! mids print the top prices and their mid, everything else prints the
//! level table.

use std::fmt::{self, Write};
use std::str::FromStr;

use book_core::{BookData, Event};

use crate::csv_codec;
use crate::wire_types::SIDE_UNKNOWN;

const TRADING_HEADER: &str = "\
|-----------------------------------------|
|         Bid        |         Ask        |
|-----------------------------------------|
|Level| Num | Qty |Price|Price| Qty | Num |
|-----------------------------------------|
";

const BETTING_HEADER: &str = "\
|-----------------------------------------|
|         Back          |       Lay       |
|-----------------------------------------|
|Level| Num | Qty |Price|Price| Qty | Num |
|-----------------------------------------|
";

const TRAILER: &str = "|-----------------------------------------|\n";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum PrintStyle {
    #[default]
    Text,
    Betting,
    Csv,
}

impl PrintStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            PrintStyle::Text => "text",
            PrintStyle::Betting => "betting",
            PrintStyle::Csv => "csv",
        }
    }
}

impl fmt::Display for PrintStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrintStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" | "T" => Ok(PrintStyle::Text),
            "betting" | "B" => Ok(PrintStyle::Betting),
            "csv" | "C" => Ok(PrintStyle::Csv),
            other => Err(format!("unknown print style {other:?} (expected text, betting or csv)")),
        }
    }
}

/// Render one record in the given style.
pub fn render(style: PrintStyle, data: &BookData) -> String {
    if style == PrintStyle::Csv {
        return csv_codec::format_book_data(data);
    }

    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = match data.event {
        Event::Trade => write_trade(&mut out, data),
        Event::Mid => write_mid(&mut out, style, data),
        _ => write_book(&mut out, style, data),
    };
    out
}

fn write_book(out: &mut String, style: PrintStyle, data: &BookData) -> fmt::Result {
    out.push_str(match style {
        PrintStyle::Betting => BETTING_HEADER,
        _ => TRADING_HEADER,
    });
    for (i, (bid, ask)) in data.bids().iter().zip(data.asks()).enumerate() {
        writeln!(
            out,
            "|{:>5}|{:>5}|{:>5}|{:>5.0}|{:>5.0}|{:>5}|{:>5}|",
            i, bid.contributors, bid.quantity, bid.price, ask.price, ask.quantity, ask.contributors
        )?;
    }
    out.push_str(TRAILER);
    Ok(())
}

fn write_trade(out: &mut String, data: &BookData) -> fmt::Result {
    let total = data.total_traded;
    let last = data.last_trade;
    writeln!(
        out,
        "Total traded:{}@{} Last trade:{} {}@{}",
        total.quantity,
        total.price,
        last.side.map_or(SIDE_UNKNOWN, |s| s.as_char()),
        last.quantity,
        last.price
    )
}

fn write_mid(out: &mut String, style: PrintStyle, data: &BookData) -> fmt::Result {
    let (bid_label, ask_label) = match style {
        PrintStyle::Betting => ("Back", "Lay"),
        _ => ("Bid", "Ask"),
    };
    writeln!(
        out,
        "{}:{:.2} {}:{:.2} Mid:{:.2}",
        bid_label,
        data.top_bid(),
        ask_label,
        data.top_ask(),
        data.mid()
    )
}
