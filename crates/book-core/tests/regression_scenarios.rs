// crates/book-core/tests/regression_scenarios.rs
use std::sync::Arc;

use book_core::{
    BookData, BookStorage, ErrorCategory, Event, HashBook, LevelQuote, MapBook, OrderBook, Side,
    Stats, VectorBook,
};
use book_protocol::csv_codec::parse_input_line;
use book_protocol::text_format::{render, PrintStyle};

const INPUT: &str = include_str!("data/feed.csv");

struct Replay<S: BookStorage> {
    book: OrderBook<S>,
    published: Vec<BookData>,
    stats: Arc<Stats>,
    failed: usize,
}

fn replay<S: BookStorage>(input: &str) -> Replay<S> {
    let stats = Arc::new(Stats::new());
    let mut book = OrderBook::<S>::with_stats(Arc::clone(&stats));
    let mut published = Vec::new();
    let mut failed = 0;

    for line in input.lines() {
        let Some(decoded) = parse_input_line(line, &stats) else {
            continue;
        };
        match decoded.and_then(|event| book.process_event(&event)) {
            Ok(records) => published.extend(records),
            Err(_) => failed += 1,
        }
    }

    Replay {
        book,
        published,
        stats,
        failed,
    }
}

fn check_final_state<S: BookStorage>() {
    let run = replay::<S>(INPUT);

    let data = run.book.book_data(5, Event::Unknown);
    assert_eq!(data.bids()[0], LevelQuote::new(2, 6, 1000));
    assert_eq!(data.bids()[1], LevelQuote::new(1, 20, 975));
    assert!(data.bids()[2..].iter().all(LevelQuote::is_empty));

    assert_eq!(data.asks()[0], LevelQuote::new(1, 5, 1025));
    assert_eq!(data.asks()[1], LevelQuote::new(1, 10, 1050));
    assert_eq!(data.asks()[2], LevelQuote::new(1, 1, 1075));
    assert!(data.asks()[3..].iter().all(LevelQuote::is_empty));

    assert_eq!(run.book.pending_match(), None);
    let total = run.book.total_traded().total();
    assert_eq!((total.side, total.quantity, total.price), (Some(Side::Ask), 4, 1100));
}

fn check_error_counts<S: BookStorage>() {
    let run = replay::<S>(INPUT);

    for category in [
        ErrorCategory::CorruptEvent,
        ErrorCategory::DuplicateOrderId,
        ErrorCategory::MissingPriceLevel,
        ErrorCategory::MissingOrder,
        ErrorCategory::NoOrderForTrade,
        ErrorCategory::CrossedWithoutTrade,
        ErrorCategory::OrderIdRange,
        ErrorCategory::SideParse,
        ErrorCategory::QuantityRange,
        ErrorCategory::QuantityParse,
        ErrorCategory::PriceRange,
    ] {
        assert_eq!(run.stats.count(category), 1, "{category:?}");
    }
    assert_eq!(run.stats.count(ErrorCategory::OrderIdParse), 0);
    assert_eq!(run.stats.count(ErrorCategory::PriceParse), 0);

    // Each failed message is counted exactly once.
    assert_eq!(run.stats.total(), run.failed as u64);
    assert_eq!(run.failed, 11);
    assert_eq!(run.published.len(), 38);
}

#[test]
fn map_book_final_state() {
    check_final_state::<MapBook>();
}

#[test]
fn hash_book_final_state() {
    check_final_state::<HashBook>();
}

#[test]
fn vector_book_final_state() {
    check_final_state::<VectorBook>();
}

#[test]
fn error_counts_are_identical_across_storage() {
    check_error_counts::<MapBook>();
    check_error_counts::<HashBook>();
    check_error_counts::<VectorBook>();
}

#[test]
fn storage_variants_publish_identical_records() {
    let map = replay::<MapBook>(INPUT).published;
    let hash = replay::<HashBook>(INPUT).published;
    let vector = replay::<VectorBook>(INPUT).published;

    assert_eq!(map, hash);
    assert_eq!(map, vector);
}

#[test]
fn published_events_follow_render_policy() {
    let run = replay::<MapBook>(INPUT);

    let trades = run.published.iter().filter(|d| d.event == Event::Trade).count();
    let mids = run.published.iter().filter(|d| d.event == Event::Mid).count();
    assert_eq!(trades, 2);
    assert_eq!(mids, run.published.len() / 2);

    // Every trade record carries its totals.
    let last = run
        .published
        .iter()
        .rfind(|d| d.event == Event::Trade)
        .map(|d| render(PrintStyle::Text, d));
    assert_eq!(last.as_deref(), Some("Total traded:3@1025 Last trade:S 1@1025\n"));
}

#[test]
fn snapshot_lines_refresh_the_book() {
    let input = "\
A,1,B,10,900
S,2,30,1000,1,5,1010,1,7,990,0,0,0,S,4,1005
S,2,30,1000,1,5,1010,1,7,990,0,0,0,U,0,0
";
    let run = replay::<VectorBook>(input);
    assert_eq!(run.failed, 0);

    let events: Vec<Event> = run.published.iter().map(|d| d.event).collect();
    assert_eq!(events, vec![Event::Mid, Event::Add, Event::Trade, Event::Snapshot]);

    let data = run.book.book_data(3, Event::Snapshot);
    assert_eq!(data.bids()[0], LevelQuote::new(1, 30, 1000));
    assert_eq!(data.bids()[1], LevelQuote::new(1, 7, 990));
    assert_eq!(data.asks()[0], LevelQuote::new(1, 5, 1010));
    assert!(data.asks()[1].is_empty());
    assert!(!run.book.storage().has_level(Side::Bid, 900));
}

#[test]
fn test_individual_scenarios() {
    // Each scenario is also valid on its own, from an empty book.
    let mut scenarios: Vec<(String, String)> = Vec::new();
    for line in INPUT.lines() {
        if let Some(name) = line.strip_prefix("#name:") {
            scenarios.push((name.trim().to_string(), String::new()));
        } else if let Some((_, body)) = scenarios.last_mut() {
            body.push_str(line);
            body.push('\n');
        }
    }
    assert_eq!(scenarios.len(), 5);

    for (name, body) in &scenarios {
        let run = replay::<HashBook>(body);
        println!("scenario {name}: {} records, {} failed", run.published.len(), run.failed);
        assert_eq!(run.stats.total(), run.failed as u64, "{name}");
    }
}
