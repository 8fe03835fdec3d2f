use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use super::{dispatch, Adapter};
use crate::types::{MessageSink, StopHandle};

/// Line-delimited file read through a buffered reader.
pub struct FileAdapter {
    path: PathBuf,
    stop: StopHandle,
    counter: u64,
}

impl FileAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileAdapter {
            path: path.into(),
            stop: StopHandle::new(),
            counter: 0,
        }
    }
}

impl Adapter for FileAdapter {
    fn start(&mut self, sink: &mut dyn MessageSink) -> Result<()> {
        let file = File::open(&self.path)
            .with_context(|| format!("opening {}", self.path.display()))?;
        info!(path = %self.path.display(), "file adapter started");

        let mut reader = BufReader::new(file);
        let mut line = String::new();
        while !self.stop.is_stopped() {
            line.clear();
            let read = reader
                .read_line(&mut line)
                .with_context(|| format!("reading {} after line {}", self.path.display(), self.counter))?;
            if read == 0 {
                break;
            }
            self.counter += 1;
            dispatch(sink, self.counter, line.trim_end_matches(['\r', '\n']));
        }

        info!(lines = self.counter, "file adapter finished");
        Ok(())
    }

    fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    fn counter(&self) -> u64 {
        self.counter
    }
}
