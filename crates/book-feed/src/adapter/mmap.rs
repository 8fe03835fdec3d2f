use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use memmap2::Mmap;
use tracing::info;

use super::{dispatch, Adapter};
use crate::types::{MessageSink, StopHandle};

/// Whole file mapped read-only and split on `\n`.
///
/// Lines are passed through lossily; a non-UTF-8 line fails to decode
/// like any other malformed message.
pub struct MmapAdapter {
    path: PathBuf,
    stop: StopHandle,
    counter: u64,
}

impl MmapAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        MmapAdapter {
            path: path.into(),
            stop: StopHandle::new(),
            counter: 0,
        }
    }
}

impl Adapter for MmapAdapter {
    fn start(&mut self, sink: &mut dyn MessageSink) -> Result<()> {
        let file = File::open(&self.path)
            .with_context(|| format!("opening {}", self.path.display()))?;
        // SAFETY: the mapping is read-only and dropped before returning; the
        // input file is not expected to change while a run is in progress.
        let map = unsafe { Mmap::map(&file) }
            .with_context(|| format!("mapping {}", self.path.display()))?;
        info!(path = %self.path.display(), bytes = map.len(), "mmap adapter started");

        let mut body: &[u8] = &map;
        if body.last() == Some(&b'\n') {
            body = &body[..body.len() - 1];
        }

        if !body.is_empty() {
            for raw in body.split(|b| *b == b'\n') {
                if self.stop.is_stopped() {
                    break;
                }
                self.counter += 1;
                let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
                dispatch(sink, self.counter, &String::from_utf8_lossy(raw));
            }
        }

        info!(lines = self.counter, "mmap adapter finished");
        Ok(())
    }

    fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    fn counter(&self) -> u64 {
        self.counter
    }
}
