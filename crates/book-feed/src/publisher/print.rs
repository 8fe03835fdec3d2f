use std::io::{self, BufWriter, Stdout, Write};

use tracing::warn;

use book_core::BookData;
use book_protocol::{render, PrintStyle};

use super::Publisher;

/// Renders each record with [`render`] and writes it out.
pub struct PrintPublisher<W: Write + Send> {
    out: W,
    style: PrintStyle,
    write_errors: u64,
}

impl PrintPublisher<BufWriter<Stdout>> {
    pub fn stdout(style: PrintStyle) -> Self {
        PrintPublisher::new(BufWriter::new(io::stdout()), style)
    }
}

impl<W: Write + Send> PrintPublisher<W> {
    pub fn new(out: W, style: PrintStyle) -> Self {
        PrintPublisher {
            out,
            style,
            write_errors: 0,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> Publisher for PrintPublisher<W> {
    fn offer(&mut self, data: BookData) {
        let text = render(self.style, &data);
        if let Err(e) = self.out.write_all(text.as_bytes()) {
            // Report the first failure only; a closed stdout fails every write.
            if self.write_errors == 0 {
                warn!(error = %e, "print publisher write failed");
            }
            self.write_errors += 1;
        }
    }

    fn stop(&mut self) {
        if let Err(e) = self.out.flush() {
            warn!(error = %e, "print publisher flush failed");
        }
        if self.write_errors > 0 {
            warn!(write_errors = self.write_errors, "print publisher lost records");
        }
    }
}
