use book_core::BookData;

use super::Publisher;

/// Discards every record. Used for raw book-maintenance timing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPublisher;

impl Publisher for NullPublisher {
    fn offer(&mut self, _data: BookData) {}

    fn stop(&mut self) {}

    fn wants_records(&self) -> bool {
        false
    }
}
